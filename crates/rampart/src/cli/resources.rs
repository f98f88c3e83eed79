//! the `resources` subcommand - manage resources

use clap::{Args, Subcommand};
use color_eyre::eyre::{Context, Result};
use rampart_db::Database;
use rampart_types::{OrgId, Resource, ResourceId};

use super::DbArgs;

/// manage resources
#[derive(Subcommand, Debug)]
pub enum ResourcesCommand {
    /// register a new resource
    Create(CreateResourceArgs),

    /// list an organisation's resources
    List(ListResourcesArgs),
}

/// register a new resource
#[derive(Args, Debug)]
pub struct CreateResourceArgs {
    #[command(flatten)]
    db: DbArgs,

    /// organisation that owns the resource
    #[arg(long)]
    org: String,

    /// resource name
    name: String,

    /// whether the resource terminates http (enables PATH and IP_SET rules)
    #[arg(long, default_value_t = false)]
    http_capable: bool,
}

/// list resources
#[derive(Args, Debug)]
pub struct ListResourcesArgs {
    #[command(flatten)]
    db: DbArgs,

    /// organisation to list resources for
    #[arg(long)]
    org: String,

    /// output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: String,
}

impl ResourcesCommand {
    /// run the resources command
    pub async fn run(self) -> Result<()> {
        match self {
            ResourcesCommand::Create(args) => create_resource(args).await,
            ResourcesCommand::List(args) => list_resources(args).await,
        }
    }
}

async fn create_resource(args: CreateResourceArgs) -> Result<()> {
    let db = args.db.connect().await?;

    let resource = Resource::new(
        ResourceId(0),
        OrgId::from(args.org),
        args.name,
        args.http_capable,
    );
    let created = db
        .create_resource(&resource)
        .await
        .context("failed to create resource")?;

    println!("Created resource:");
    println!("  ID:           {}", created.id.0);
    println!("  Org:          {}", created.org_id);
    println!("  Name:         {}", created.name);
    println!("  HTTP capable: {}", created.http_capable);

    Ok(())
}

async fn list_resources(args: ListResourcesArgs) -> Result<()> {
    let db = args.db.connect().await?;

    let resources = db
        .list_resources(&OrgId::from(args.org))
        .await
        .context("failed to list resources")?;

    if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&resources)?);
        return Ok(());
    }

    // table output
    if resources.is_empty() {
        println!("No resources found.");
        return Ok(());
    }

    println!("{:<6} {:<30} {:<12} {:<20}", "ID", "NAME", "HTTP", "CREATED");
    println!("{}", "-".repeat(70));

    for resource in resources {
        println!(
            "{:<6} {:<30} {:<12} {:<20}",
            resource.id.0,
            resource.name,
            if resource.http_capable { "yes" } else { "no" },
            resource.created_at.format("%Y-%m-%d %H:%M"),
        );
    }

    Ok(())
}
