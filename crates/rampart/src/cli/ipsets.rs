//! the `ipsets` subcommand - manage ip sets

use clap::{Args, Subcommand};
use color_eyre::eyre::{Context, Result};
use rampart_rules::{IpSetSpec, RuleEngine};
use rampart_types::{IpSetId, Name, OrgId};

use super::DbArgs;

/// manage ip sets
#[derive(Subcommand, Debug)]
pub enum IpsetsCommand {
    /// create a new ip set
    Create(CreateIpSetArgs),

    /// list an organisation's ip sets
    List(ListIpSetsArgs),

    /// delete an ip set that no rule references
    Delete(DeleteIpSetArgs),
}

/// create a new ip set
#[derive(Args, Debug)]
pub struct CreateIpSetArgs {
    #[command(flatten)]
    db: DbArgs,

    /// organisation that owns the set
    #[arg(long)]
    org: String,

    /// set name
    name: String,

    /// description (optional)
    #[arg(long)]
    description: Option<String>,

    /// member addresses and cidr networks (comma-separated)
    #[arg(long, value_delimiter = ',')]
    addresses: Vec<String>,
}

/// list ip sets
#[derive(Args, Debug)]
pub struct ListIpSetsArgs {
    #[command(flatten)]
    db: DbArgs,

    /// organisation to list ip sets for
    #[arg(long)]
    org: String,

    /// output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: String,
}

/// delete an ip set
#[derive(Args, Debug)]
pub struct DeleteIpSetArgs {
    #[command(flatten)]
    db: DbArgs,

    /// organisation that owns the set
    #[arg(long)]
    org: String,

    /// ip set id to delete
    ip_set_id: String,
}

impl IpsetsCommand {
    /// run the ipsets command
    pub async fn run(self) -> Result<()> {
        match self {
            IpsetsCommand::Create(args) => create_ip_set(args).await,
            IpsetsCommand::List(args) => list_ip_sets(args).await,
            IpsetsCommand::Delete(args) => delete_ip_set(args).await,
        }
    }
}

async fn create_ip_set(args: CreateIpSetArgs) -> Result<()> {
    let db = args.db.connect().await?;
    let engine = RuleEngine::new(db);

    let name: Name = args.name.parse().context("invalid ip set name")?;
    let created = engine
        .create_ip_set(
            &OrgId::from(args.org),
            IpSetSpec {
                name,
                description: args.description,
                addresses: args.addresses,
            },
        )
        .await
        .context("failed to create ip set")?;

    println!("Created ip set:");
    println!("  ID:        {}", created.id);
    println!("  Org:       {}", created.org_id);
    println!("  Name:      {}", created.name);
    if !created.addresses.is_empty() {
        println!("  Addresses: {}", created.addresses.join(", "));
    }

    Ok(())
}

async fn list_ip_sets(args: ListIpSetsArgs) -> Result<()> {
    let db = args.db.connect().await?;
    let engine = RuleEngine::new(db);

    let sets = engine
        .list_ip_sets(&OrgId::from(args.org))
        .await
        .context("failed to list ip sets")?;

    if args.output == "json" {
        println!("{}", serde_json::to_string_pretty(&sets)?);
        return Ok(());
    }

    // table output
    if sets.is_empty() {
        println!("No ip sets found.");
        return Ok(());
    }

    println!("{:<24} {:<20} {:<10} {:<40}", "ID", "NAME", "MEMBERS", "DESCRIPTION");
    println!("{}", "-".repeat(95));

    for set in sets {
        println!(
            "{:<24} {:<20} {:<10} {:<40}",
            set.id,
            set.name,
            set.addresses.len(),
            set.description.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

async fn delete_ip_set(args: DeleteIpSetArgs) -> Result<()> {
    let db = args.db.connect().await?;
    let engine = RuleEngine::new(db);

    engine
        .delete_ip_set(&OrgId::from(args.org), &IpSetId::from(args.ip_set_id.clone()))
        .await
        .context("failed to delete ip set")?;

    println!("Deleted ip set {}", args.ip_set_id);

    Ok(())
}
