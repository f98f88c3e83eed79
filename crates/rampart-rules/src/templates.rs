//! rule template authoring.
//!
//! templates hold org-scoped rule collections. template rules are
//! restricted to kinds that are meaningful on any resource snapshot:
//! `CIDR`, `IP`, and `PATH`. the `IP_CIDR` pseudo-kind and `IP_SET`
//! references are only available on rules created directly on a
//! resource.

use chrono::Utc;
use rampart_db::Database;
use rampart_types::{
    Name, OrgId, RuleAction, RuleMatch, RuleMatchInput, RuleTemplate, TemplateId, TemplateRule,
    TemplateRuleId,
};
use tracing::info;

use crate::engine::RuleEngine;
use crate::error::{Error, Result};
use crate::normalize::{validate_cidr, validate_ip, validate_path};
use crate::priority::next_priority;
use crate::sync::Propagation;

/// fields for creating a rule template.
#[derive(Debug, Clone)]
pub struct NewTemplate {
    /// caller-supplied identifier; generated when absent.
    pub id: Option<TemplateId>,
    /// template name, unique within the organisation.
    pub name: Name,
    /// optional free-form description.
    pub description: Option<String>,
}

/// a partial template update; absent fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct TemplateUpdate {
    /// new name.
    pub name: Option<Name>,
    /// new description.
    pub description: Option<String>,
}

impl TemplateUpdate {
    /// true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// a caller-submitted template rule.
#[derive(Debug, Clone)]
pub struct TemplateRuleSpec {
    /// accept or drop.
    pub action: RuleAction,
    /// the submitted match kind; only `CIDR`, `IP`, and `PATH` are
    /// accepted on templates.
    pub match_kind: RuleMatchInput,
    /// the match value.
    pub value: String,
    /// explicit priority; appended after existing rules when absent.
    pub priority: Option<i64>,
    /// whether the rule is evaluated; defaults to enabled.
    pub enabled: Option<bool>,
}

/// a partial template rule update; absent fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct TemplateRuleUpdate {
    /// new action.
    pub action: Option<RuleAction>,
    /// new match kind.
    pub match_kind: Option<RuleMatchInput>,
    /// new match value.
    pub value: Option<String>,
    /// new priority; reorders the template only, copies keep theirs.
    pub priority: Option<i64>,
    /// new enabled flag.
    pub enabled: Option<bool>,
}

impl TemplateRuleUpdate {
    /// true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.action.is_none()
            && self.match_kind.is_none()
            && self.value.is_none()
            && self.priority.is_none()
            && self.enabled.is_none()
    }
}

/// restrict a submitted kind to the template-capable set.
fn template_match_kind(input: RuleMatchInput) -> Result<RuleMatch> {
    match input {
        RuleMatchInput::Cidr => Ok(RuleMatch::Cidr),
        RuleMatchInput::Ip => Ok(RuleMatch::Ip),
        RuleMatchInput::Path => Ok(RuleMatch::Path),
        RuleMatchInput::IpCidr | RuleMatchInput::IpSet => Err(Error::InvalidRule(format!(
            "{input} rules are not allowed on templates"
        ))),
    }
}

/// validate a template rule value against its kind.
fn validate_template_value(match_kind: RuleMatch, value: &str) -> Result<()> {
    match match_kind {
        RuleMatch::Cidr => validate_cidr(value),
        RuleMatch::Ip => validate_ip(value),
        RuleMatch::Path => validate_path(value),
        RuleMatch::IpSet => Err(Error::InvalidRule(
            "IP_SET rules are not allowed on templates".to_string(),
        )),
    }
}

impl<D: Database> RuleEngine<D> {
    /// create a rule template.
    pub async fn create_template(
        &self,
        org_id: &OrgId,
        new: NewTemplate,
    ) -> Result<RuleTemplate> {
        let name = new.name.into_inner();
        if self.db.get_template_by_name(org_id, &name).await?.is_some() {
            return Err(Error::Conflict(format!(
                "template '{name}' already exists in organisation '{org_id}'"
            )));
        }
        let id = match new.id {
            Some(id) => {
                if id.as_str().is_empty() {
                    return Err(Error::InvalidRule("template id cannot be empty".to_string()));
                }
                if self.db.get_template(&id).await?.is_some() {
                    return Err(Error::Conflict(format!(
                        "template id '{id}' is already in use"
                    )));
                }
                id
            }
            None => TemplateId::generate(),
        };
        let template = RuleTemplate::new(id, org_id.clone(), name, new.description);
        let created = self.db.create_template(&template).await?;
        info!(
            template_id = %created.id,
            org_id = %org_id,
            name = %created.name,
            "rule template created"
        );
        Ok(created)
    }

    /// get a template by id.
    pub async fn get_template(
        &self,
        org_id: &OrgId,
        template_id: &TemplateId,
    ) -> Result<RuleTemplate> {
        self.require_template(org_id, template_id).await
    }

    /// list an organisation's templates.
    pub async fn list_templates(&self, org_id: &OrgId) -> Result<Vec<RuleTemplate>> {
        Ok(self.db.list_templates(org_id).await?)
    }

    /// apply a partial update to a template.
    pub async fn update_template(
        &self,
        org_id: &OrgId,
        template_id: &TemplateId,
        update: TemplateUpdate,
    ) -> Result<RuleTemplate> {
        if update.is_empty() {
            return Err(Error::InvalidRule(
                "update must change at least one field".to_string(),
            ));
        }
        let mut template = self.require_template(org_id, template_id).await?;
        if let Some(name) = update.name {
            let name = name.into_inner();
            if let Some(existing) = self.db.get_template_by_name(org_id, &name).await?
                && existing.id != template.id
            {
                return Err(Error::Conflict(format!(
                    "template '{name}' already exists in organisation '{org_id}'"
                )));
            }
            template.name = name;
        }
        if let Some(description) = update.description {
            template.description = Some(description);
        }
        let updated = self.db.update_template(&template).await?;
        info!(template_id = %template_id, "rule template updated");
        Ok(updated)
    }

    /// add a rule to a template and copy it to every assigned resource.
    pub async fn add_template_rule(
        &self,
        org_id: &OrgId,
        template_id: &TemplateId,
        spec: TemplateRuleSpec,
    ) -> Result<(TemplateRule, Propagation)> {
        let template = self.require_template(org_id, template_id).await?;
        let match_kind = template_match_kind(spec.match_kind)?;
        validate_template_value(match_kind, &spec.value)?;

        if self
            .db
            .find_template_rule(&template.id, spec.action, match_kind, &spec.value)
            .await?
            .is_some()
        {
            return Err(Error::Conflict(format!(
                "template '{template_id}' already contains an identical rule"
            )));
        }

        let created = {
            let _alloc = self.alloc_lock.lock().await;
            let priority = match spec.priority {
                Some(priority) => priority,
                None => next_priority(self.db.max_template_rule_priority(&template.id).await?),
            };
            let now = Utc::now();
            let rule = TemplateRule {
                id: TemplateRuleId(0),
                template_id: template.id.clone(),
                action: spec.action,
                match_kind,
                value: spec.value,
                priority,
                enabled: spec.enabled.unwrap_or(true),
                created_at: now,
                updated_at: now,
            };
            self.db.create_template_rule(&rule).await?
        };

        let propagation = self.propagate_rule_added(&created).await?;
        info!(
            template_rule_id = created.id.0,
            template_id = %template_id,
            copies_created = propagation.copies_affected,
            "template rule added"
        );
        Ok((created, propagation))
    }

    /// list a template's rules in priority order.
    pub async fn list_template_rules(
        &self,
        org_id: &OrgId,
        template_id: &TemplateId,
    ) -> Result<Vec<TemplateRule>> {
        let template = self.require_template(org_id, template_id).await?;
        Ok(self.db.list_template_rules(&template.id).await?)
    }

    /// apply a partial update to a template rule and push the change to
    /// every copy.
    ///
    /// priority changes reorder the template only; copies keep the
    /// per-resource priorities they were materialised with.
    pub async fn update_template_rule(
        &self,
        org_id: &OrgId,
        template_id: &TemplateId,
        rule_id: TemplateRuleId,
        update: TemplateRuleUpdate,
    ) -> Result<(TemplateRule, Propagation)> {
        if update.is_empty() {
            return Err(Error::InvalidRule(
                "update must change at least one field".to_string(),
            ));
        }
        let template = self.require_template(org_id, template_id).await?;
        let mut rule = self
            .db
            .get_template_rule(rule_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("template rule {rule_id} not found")))?;
        if rule.template_id != template.id {
            return Err(Error::Forbidden(format!(
                "template rule {rule_id} belongs to a different template"
            )));
        }

        if let Some(action) = update.action {
            rule.action = action;
        }
        if update.match_kind.is_some() || update.value.is_some() {
            let match_kind = match update.match_kind {
                Some(input) => template_match_kind(input)?,
                None => rule.match_kind,
            };
            let value = update.value.unwrap_or_else(|| rule.value.clone());
            validate_template_value(match_kind, &value)?;
            rule.match_kind = match_kind;
            rule.value = value;
        }
        if let Some(existing) = self
            .db
            .find_template_rule(&template.id, rule.action, rule.match_kind, &rule.value)
            .await?
            && existing.id != rule.id
        {
            return Err(Error::Conflict(format!(
                "template '{template_id}' already contains an identical rule"
            )));
        }
        if let Some(priority) = update.priority {
            rule.priority = priority;
        }
        if let Some(enabled) = update.enabled {
            rule.enabled = enabled;
        }

        let updated = self.db.update_template_rule(&rule).await?;
        let propagation = self.propagate_rule_updated(&updated).await?;
        info!(
            template_rule_id = rule_id.0,
            template_id = %template_id,
            copies_updated = propagation.copies_affected,
            "template rule updated"
        );
        Ok((updated, propagation))
    }
}
