use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use uuid::Uuid;

use review_authz::authz::flatten::flatten;
use review_authz::authz::{ActorContext, DefaultPolicyEvaluator, PolicyEvaluator};
use review_authz::config::{load_env, AuthzConfig};
use review_authz::db::{self, SqliteStore};
use review_authz::fixtures::load_fixture;
use review_authz::models::{Action, PermissionNode, Subject};
use review_authz::store::AccessStore;
use review_authz::{Authorizer, RuntimeContext};

#[derive(Parser, Debug)]
#[command(author, version, about = "review authorization toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a single "can <actor> <action> <subject>" query
    Check {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        actor: Uuid,
        #[arg(long)]
        action: String,
        #[arg(long)]
        subject: String,
        /// Resource attribute as key=value; the value is parsed as JSON when possible
        #[arg(long = "attr", value_parser = parse_attr)]
        attrs: Vec<(String, Value)>,
        #[arg(long)]
        field: Option<String>,
    },
    /// Print the flat permission summary of an actor as JSON
    Summarize {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        actor: Uuid,
    },
    /// Print the flattened leaves of a permission tree file
    Flatten { tree: PathBuf },
    /// Apply the bundled migrations to DATABASE_URL
    Migrate,
}

#[derive(Args, Debug)]
struct Source {
    /// Read roles, groups and users from a JSON fixture instead of DATABASE_URL
    #[arg(long)]
    fixture: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env();
    init_tracing();

    let cli = Cli::parse();
    let config = AuthzConfig::from_env()?;

    match cli.command {
        Commands::Check {
            source,
            actor,
            action,
            subject,
            attrs,
            field,
        } => {
            let query = Query {
                actor,
                action: Action::from(action.as_str()),
                subject: Subject::from(subject.as_str()),
                attrs,
                field,
            };
            let allowed = match source.fixture {
                Some(path) => {
                    let store = load_fixture(&path)?.into_store();
                    check(Authorizer::with_config(store, &config), query).await?
                }
                None => {
                    let store = sqlite_store(&config).await?;
                    check(Authorizer::with_config(store, &config), query).await?
                }
            };
            println!("{}", if allowed { "allow" } else { "deny" });
        }
        Commands::Summarize { source, actor } => {
            let summary = match source.fixture {
                Some(path) => {
                    let store = load_fixture(&path)?.into_store();
                    Authorizer::with_config(store, &config).summarize_by_id(actor).await?
                }
                None => {
                    let store = sqlite_store(&config).await?;
                    Authorizer::with_config(store, &config).summarize_by_id(actor).await?
                }
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Flatten { tree } => {
            let raw = fs::read_to_string(&tree).with_context(|| format!("failed to read {}", tree.display()))?;
            let value: Value = serde_json::from_str(&raw).context("tree file is not valid JSON")?;
            let tree = PermissionNode::from(value);
            for grant in flatten(&tree) {
                println!("{}\t{}", grant.path, grant.value.raw_text());
            }
        }
        Commands::Migrate => {
            let url = database_url(&config)?;
            let pool = db::connect(url).await?;
            db::migrate(&pool).await?;
            println!("Migrations applied");
        }
    }

    Ok(())
}

struct Query {
    actor: Uuid,
    action: Action,
    subject: Subject,
    attrs: Vec<(String, Value)>,
    field: Option<String>,
}

async fn check<S: AccessStore>(authorizer: Authorizer<S>, query: Query) -> anyhow::Result<bool> {
    let Some(actor) = authorizer.store().fetch_actor(query.actor).await? else {
        tracing::warn!(actor_id = %query.actor, "unknown actor; denying");
        return Ok(false);
    };

    let policy = authorizer.resolve(&actor).await?;
    tracing::info!(actor_id = %actor.id, rules = policy.rules.len(), "policy compiled");

    let mut ctx = RuntimeContext::new().with_actor(ActorContext::from(&actor));
    for (key, value) in query.attrs {
        ctx = ctx.with_attribute(key, value);
    }
    if let Some(field) = query.field {
        ctx = ctx.with_field(field);
    }

    Ok(DefaultPolicyEvaluator.can(&policy, &query.action, &query.subject, &ctx))
}

fn database_url(config: &AuthzConfig) -> anyhow::Result<&str> {
    config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set (or pass --fixture)")
}

async fn sqlite_store(config: &AuthzConfig) -> anyhow::Result<SqliteStore> {
    let pool = db::connect(database_url(config)?).await?;
    Ok(SqliteStore::new(pool))
}

fn parse_attr(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{}`", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty attribute name in `{}`", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    // Logs go to stderr so command output stays machine-readable.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry().with(filter_layer).with(fmt_layer).init();
}
