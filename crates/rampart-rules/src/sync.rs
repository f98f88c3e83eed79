//! template assignment and copy propagation.
//!
//! assigning a template materialises a linked copy of each template
//! rule onto the resource. later template edits are pushed to the
//! copies, and copy removal on a single resource acts as a local
//! override. copy maintenance is best-effort: an assignment or a
//! template edit never fails because one resource could not take the
//! change, the skipped resource is reported as a warning instead.

use chrono::Utc;
use rampart_db::Database;
use rampart_types::{
    OrgId, Resource, ResourceId, ResourceRule, RuleId, TemplateAssignment, TemplateId,
    TemplateRule, TemplateRuleId,
};
use tracing::{info, warn};

use crate::engine::{RuleEngine, check_capability};
use crate::error::{Error, Result};
use crate::priority::{append_priorities, next_priority};

/// the result of pushing a template rule change to its copies.
#[derive(Debug, Clone, Default)]
pub struct Propagation {
    /// how many copies were created or updated.
    pub copies_affected: u64,
    /// one entry per resource that could not take the change.
    pub warnings: Vec<String>,
}

/// the result of assigning a template to a resource.
#[derive(Debug, Clone)]
pub struct AssignOutcome {
    /// the stored assignment.
    pub assignment: TemplateAssignment,
    /// how many rule copies were materialised.
    pub copies_created: u64,
    /// one entry per template rule that could not be copied.
    pub warnings: Vec<String>,
}

/// the result of deleting a template rule.
#[derive(Debug, Clone, Default)]
pub struct TemplateRuleRemoval {
    /// how many linked copies were removed.
    pub copies_removed: u64,
    /// populated when copy cleanup failed.
    pub warnings: Vec<String>,
}

/// the result of deleting a whole template.
#[derive(Debug, Clone, Default)]
pub struct TemplateRemoval {
    /// how many template rules were removed.
    pub rules_removed: u64,
    /// how many linked copies were removed across all resources.
    pub copies_removed: u64,
    /// how many assignments were removed.
    pub assignments_removed: u64,
    /// populated when copy cleanup failed.
    pub warnings: Vec<String>,
}

impl<D: Database> RuleEngine<D> {
    /// assign a template to a resource and materialise its rules.
    ///
    /// the copies are appended after the resource's existing rules in
    /// template order. the assignment is kept even when some copies
    /// cannot be created; each failed copy becomes a warning.
    pub async fn assign_template(
        &self,
        resource_id: ResourceId,
        template_id: &TemplateId,
    ) -> Result<AssignOutcome> {
        let resource = self.require_resource(resource_id).await?;
        let template = self.require_template(&resource.org_id, template_id).await?;
        if self
            .db
            .get_assignment(resource_id, &template.id)
            .await?
            .is_some()
        {
            return Err(Error::Conflict(format!(
                "template '{template_id}' is already assigned to resource {resource_id}"
            )));
        }

        let assignment = self
            .db
            .create_assignment(&TemplateAssignment::new(resource_id, template.id.clone()))
            .await?;

        let rules = self.db.list_template_rules(&template.id).await?;
        let mut copies_created = 0u64;
        let mut warnings = Vec::new();
        let _alloc = self.alloc_lock.lock().await;
        let base = self.db.max_resource_rule_priority(resource_id).await?;
        // a rule that cannot be copied keeps its slot, so the surviving
        // copies stay aligned with the template order
        for (rule, priority) in rules.iter().zip(append_priorities(base, rules.len())) {
            match self.materialize_copy(&resource, rule, priority).await {
                Ok(_) => copies_created += 1,
                Err(e) => {
                    warn!(
                        template_rule_id = rule.id.0,
                        resource_id = resource_id.0,
                        error = %e,
                        "skipping template rule during assignment"
                    );
                    warnings.push(format!("template rule {} was not copied: {e}", rule.id));
                }
            }
        }
        info!(
            resource_id = resource_id.0,
            template_id = %template_id,
            copies_created,
            "template assigned to resource"
        );
        Ok(AssignOutcome {
            assignment,
            copies_created,
            warnings,
        })
    }

    /// remove a template from a resource, deleting the assignment and
    /// every copy the template materialised there.
    pub async fn unassign_template(
        &self,
        resource_id: ResourceId,
        template_id: &TemplateId,
    ) -> Result<u64> {
        let resource = self.require_resource(resource_id).await?;
        let template = self.require_template(&resource.org_id, template_id).await?;
        if self
            .db
            .get_assignment(resource_id, &template.id)
            .await?
            .is_none()
        {
            return Err(Error::NotFound(format!(
                "template '{template_id}' is not assigned to resource {resource_id}"
            )));
        }
        self.db.delete_assignment(resource_id, &template.id).await?;

        let rules = self.db.list_template_rules(&template.id).await?;
        let rule_ids: Vec<TemplateRuleId> = rules.iter().map(|rule| rule.id).collect();
        let copies_removed = self
            .db
            .delete_linked_resource_rules_on_resource(resource_id, &rule_ids)
            .await?;
        info!(
            resource_id = resource_id.0,
            template_id = %template_id,
            copies_removed,
            "template unassigned from resource"
        );
        Ok(copies_removed)
    }

    /// list the templates assigned to a resource.
    pub async fn list_assignments(
        &self,
        resource_id: ResourceId,
    ) -> Result<Vec<TemplateAssignment>> {
        self.require_resource(resource_id).await?;
        Ok(self.db.list_assignments_for_resource(resource_id).await?)
    }

    /// delete a template rule and remove its copies from every resource.
    ///
    /// the template rule itself is removed first; a copy cleanup failure
    /// is reported as a warning rather than resurrecting the rule.
    pub async fn delete_template_rule(
        &self,
        org_id: &OrgId,
        template_id: &TemplateId,
        rule_id: TemplateRuleId,
    ) -> Result<TemplateRuleRemoval> {
        let template = self.require_template(org_id, template_id).await?;
        let rule = self
            .db
            .get_template_rule(rule_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("template rule {rule_id} not found")))?;
        if rule.template_id != template.id {
            return Err(Error::Forbidden(format!(
                "template rule {rule_id} belongs to a different template"
            )));
        }

        self.db.delete_template_rule(rule_id).await?;
        let mut removal = TemplateRuleRemoval::default();
        match self.db.delete_linked_resource_rules(rule_id).await {
            Ok(count) => removal.copies_removed = count,
            Err(e) => {
                warn!(
                    template_rule_id = rule_id.0,
                    error = %e,
                    "failed to remove template rule copies"
                );
                removal.warnings.push(format!(
                    "copies of template rule {rule_id} were not removed: {e}"
                ));
            }
        }
        info!(
            template_rule_id = rule_id.0,
            template_id = %template_id,
            copies_removed = removal.copies_removed,
            "template rule deleted"
        );
        Ok(removal)
    }

    /// delete a template along with its rules, assignments, and every
    /// copy on every resource.
    pub async fn delete_template(
        &self,
        org_id: &OrgId,
        template_id: &TemplateId,
    ) -> Result<TemplateRemoval> {
        let template = self.require_template(org_id, template_id).await?;
        let rules = self.db.list_template_rules(&template.id).await?;

        let mut removal = TemplateRemoval::default();
        for rule in &rules {
            self.db.delete_template_rule(rule.id).await?;
            removal.rules_removed += 1;
            match self.db.delete_linked_resource_rules(rule.id).await {
                Ok(count) => removal.copies_removed += count,
                Err(e) => {
                    warn!(
                        template_rule_id = rule.id.0,
                        error = %e,
                        "failed to remove template rule copies"
                    );
                    removal.warnings.push(format!(
                        "copies of template rule {} were not removed: {e}",
                        rule.id
                    ));
                }
            }
        }
        removal.assignments_removed = self
            .db
            .delete_assignments_for_template(&template.id)
            .await?;
        self.db.delete_template(&template.id).await?;
        info!(
            template_id = %template_id,
            rules_removed = removal.rules_removed,
            copies_removed = removal.copies_removed,
            assignments_removed = removal.assignments_removed,
            "rule template deleted"
        );
        Ok(removal)
    }

    /// copy a new template rule to every assigned resource.
    ///
    /// resources that already hold a copy are skipped, so replays after
    /// a partial failure only fill in the gaps.
    pub(crate) async fn propagate_rule_added(&self, rule: &TemplateRule) -> Result<Propagation> {
        let assignments = self
            .db
            .list_assignments_for_template(&rule.template_id)
            .await?;
        let mut propagation = Propagation::default();
        let _alloc = self.alloc_lock.lock().await;
        for assignment in assignments {
            match self
                .copy_rule_to_resource(assignment.resource_id, rule)
                .await
            {
                Ok(true) => propagation.copies_affected += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        template_rule_id = rule.id.0,
                        resource_id = assignment.resource_id.0,
                        error = %e,
                        "failed to copy template rule to resource"
                    );
                    propagation.warnings.push(format!(
                        "resource {} did not receive the rule: {e}",
                        assignment.resource_id
                    ));
                }
            }
        }
        Ok(propagation)
    }

    /// overwrite every copy of a template rule with its current fields.
    ///
    /// copy priorities are per-resource state and are left alone.
    pub(crate) async fn propagate_rule_updated(&self, rule: &TemplateRule) -> Result<Propagation> {
        let copies = self.db.list_linked_resource_rules(rule.id).await?;
        let mut propagation = Propagation::default();
        for mut copy in copies {
            copy.action = rule.action;
            copy.match_kind = rule.match_kind;
            copy.value = rule.value.clone();
            copy.enabled = rule.enabled;
            match self.db.update_resource_rule(&copy).await {
                Ok(_) => propagation.copies_affected += 1,
                Err(e) => {
                    warn!(
                        rule_id = copy.id.0,
                        resource_id = copy.resource_id.0,
                        error = %e,
                        "failed to update template rule copy"
                    );
                    propagation.warnings.push(format!(
                        "copy {} on resource {} was not updated: {e}",
                        copy.id, copy.resource_id
                    ));
                }
            }
        }
        Ok(propagation)
    }

    /// materialise one copy on a resource that does not have it yet.
    /// the caller holds the allocation lock.
    async fn copy_rule_to_resource(
        &self,
        resource_id: ResourceId,
        rule: &TemplateRule,
    ) -> Result<bool> {
        if self
            .db
            .get_linked_resource_rule(resource_id, rule.id)
            .await?
            .is_some()
        {
            return Ok(false);
        }
        let resource = self.require_resource(resource_id).await?;
        let priority = next_priority(self.db.max_resource_rule_priority(resource_id).await?);
        self.materialize_copy(&resource, rule, priority).await?;
        Ok(true)
    }

    /// insert a linked copy of a template rule at the given priority.
    async fn materialize_copy(
        &self,
        resource: &Resource,
        rule: &TemplateRule,
        priority: i64,
    ) -> Result<ResourceRule> {
        check_capability(resource, rule.match_kind)?;
        let now = Utc::now();
        let copy = ResourceRule {
            id: RuleId(0),
            resource_id: resource.id,
            action: rule.action,
            match_kind: rule.match_kind,
            value: rule.value.clone(),
            priority,
            enabled: rule.enabled,
            ip_set_id: None,
            template_rule_id: Some(rule.id),
            created_at: now,
            updated_at: now,
        };
        Ok(self.db.create_resource_rule(&copy).await?)
    }
}
