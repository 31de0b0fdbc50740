use actix::{Actor, Addr};
use casefile::app_config::AppConfig;
use casefile::events::{EventBus, EventLogger, Subscribe};
use casefile::orm::{cases, clients, evidence, locations, reports};
use casefile::sanitize::Sanitizer;
use casefile::schema::ManagedEntity;
use casefile::{QueryOptions, RawInput, Repository};
use env_logger::Env;
use sea_orm::{DatabaseConnection, PrimaryKeyTrait};
use serde::Serialize;

const USAGE: &str = "usage: casefile [list <entity> [column=value ...] | get <entity> <id>]";

#[actix::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    });

    let db = casefile::db::connect(&config.database).await?;
    casefile::db::create_schema(&db).await?;

    let bus = EventBus::new(config.events.mailbox_capacity).start();
    bus.send(Subscribe(EventLogger.start().recipient())).await?;

    let services = Services {
        db,
        bus,
        sanitizer: Sanitizer::from_config(&config.validation),
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] => {
            log::info!("Store ready");
        }
        ["list", entity, filters @ ..] => {
            let mut raw = RawInput::new();
            for pair in filters.iter() {
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| anyhow::anyhow!("expected column=value, got {:?}", pair))?;
                raw.insert(key.to_string(), value.into());
            }
            let mut options = QueryOptions::from_raw(&raw);
            if !raw.contains_key("limit") && !raw.contains_key("per_page") {
                options.limit = config.listing.default_limit;
            }
            println!("{}", dispatch(entity, services, Command::List(options)).await?);
        }
        ["get", entity, id] => {
            let id: i32 = id.parse()?;
            println!("{}", dispatch(entity, services, Command::Get(id)).await?);
        }
        _ => anyhow::bail!(USAGE),
    }

    Ok(())
}

enum Command {
    List(QueryOptions),
    Get(i32),
}

struct Services {
    db: DatabaseConnection,
    bus: Addr<EventBus>,
    sanitizer: Sanitizer,
}

async fn dispatch(
    entity: &str,
    services: Services,
    command: Command,
) -> anyhow::Result<String> {
    match entity {
        "case" | "cases" => run::<cases::Entity>(services, command).await,
        "report" | "reports" => run::<reports::Entity>(services, command).await,
        "client" | "clients" => run::<clients::Entity>(services, command).await,
        "evidence" => run::<evidence::Entity>(services, command).await,
        "location" | "locations" => run::<locations::Entity>(services, command).await,
        other => anyhow::bail!("unknown entity {:?}", other),
    }
}

async fn run<E>(services: Services, command: Command) -> anyhow::Result<String>
where
    E: ManagedEntity,
    E::Model: Serialize + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i32>,
{
    let repository = Repository::<E>::new(services.db)
        .with_sanitizer(services.sanitizer)
        .with_events(services.bus);
    let json = match command {
        Command::List(options) => serde_json::to_string_pretty(&repository.list(&options).await?)?,
        Command::Get(id) => match repository.get(id).await? {
            Some(record) => serde_json::to_string_pretty(&record)?,
            None => anyhow::bail!("{} {} not found", E::schema().kind, id),
        },
    };
    Ok(json)
}
