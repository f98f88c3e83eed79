//! the `templates` subcommand - manage rule templates

use clap::{Args, Subcommand};
use color_eyre::eyre::{Context, Result};
use rampart_rules::{NewTemplate, RuleEngine};
use rampart_types::{Name, OrgId, TemplateId};

use super::DbArgs;

/// manage rule templates
#[derive(Subcommand, Debug)]
pub enum TemplatesCommand {
    /// create a new rule template
    Create(CreateTemplateArgs),

    /// list an organisation's templates
    List(ListTemplatesArgs),

    /// delete a template, its rules, and every copy on assigned resources
    Delete(DeleteTemplateArgs),
}

/// create a new rule template
#[derive(Args, Debug)]
pub struct CreateTemplateArgs {
    #[command(flatten)]
    db: DbArgs,

    /// organisation that owns the template
    #[arg(long)]
    org: String,

    /// template name
    name: String,

    /// description (optional)
    #[arg(long)]
    description: Option<String>,

    /// explicit template id (generated if omitted)
    #[arg(long)]
    id: Option<String>,
}

/// list templates
#[derive(Args, Debug)]
pub struct ListTemplatesArgs {
    #[command(flatten)]
    db: DbArgs,

    /// organisation to list templates for
    #[arg(long)]
    org: String,

    /// output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: String,
}

/// delete a template
#[derive(Args, Debug)]
pub struct DeleteTemplateArgs {
    #[command(flatten)]
    db: DbArgs,

    /// organisation that owns the template
    #[arg(long)]
    org: String,

    /// template id to delete
    template_id: String,
}

impl TemplatesCommand {
    /// run the templates command
    pub async fn run(self) -> Result<()> {
        match self {
            TemplatesCommand::Create(args) => create_template(args).await,
            TemplatesCommand::List(args) => list_templates(args).await,
            TemplatesCommand::Delete(args) => delete_template(args).await,
        }
    }
}

async fn create_template(args: CreateTemplateArgs) -> Result<()> {
    let db = args.db.connect().await?;
    let engine = RuleEngine::new(db);

    let name: Name = args.name.parse().context("invalid template name")?;
    let created = engine
        .create_template(
            &OrgId::from(args.org),
            NewTemplate {
                id: args.id.map(TemplateId::from),
                name,
                description: args.description,
            },
        )
        .await
        .context("failed to create template")?;

    println!("Created template:");
    println!("  ID:          {}", created.id);
    println!("  Org:         {}", created.org_id);
    println!("  Name:        {}", created.name);
    if let Some(description) = &created.description {
        println!("  Description: {}", description);
    }

    Ok(())
}

async fn list_templates(args: ListTemplatesArgs) -> Result<()> {
    let db = args.db.connect().await?;
    let engine = RuleEngine::new(db);

    let templates = engine
        .list_templates(&OrgId::from(args.org))
        .await
        .context("failed to list templates")?;

    if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    // table output
    if templates.is_empty() {
        println!("No templates found.");
        return Ok(());
    }

    println!("{:<24} {:<24} {:<40}", "ID", "NAME", "DESCRIPTION");
    println!("{}", "-".repeat(90));

    for template in templates {
        println!(
            "{:<24} {:<24} {:<40}",
            template.id,
            template.name,
            template.description.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

async fn delete_template(args: DeleteTemplateArgs) -> Result<()> {
    let db = args.db.connect().await?;
    let engine = RuleEngine::new(db);

    let removal = engine
        .delete_template(&OrgId::from(args.org), &TemplateId::from(args.template_id.clone()))
        .await
        .context("failed to delete template")?;

    println!("Deleted template {}:", args.template_id);
    println!("  Rules removed:       {}", removal.rules_removed);
    println!("  Copies removed:      {}", removal.copies_removed);
    println!("  Assignments removed: {}", removal.assignments_removed);
    for warning in &removal.warnings {
        println!("  Warning: {}", warning);
    }

    Ok(())
}
