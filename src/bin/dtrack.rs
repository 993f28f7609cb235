//! Dependency-Track CLI binary.
//!
//! A command-line interface for the Dependency-Track API and the
//! dependency report.

use std::process::ExitCode;

use clap::Parser;
use dtrack::cli::{Cli, Command, Entity, ReportArgs, UploadArgs};
use dtrack::{
    report, BomTarget, BomUpload, ClientConfig, DtClient, DtError, ExportOptions, PrettyPrint,
    Resource,
};
use tabled::{Table, Tabled};
use tracing::Level;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let client = match build_client(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: pass --config-file or set DT_API_KEY");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn build_client(cli: &Cli) -> dtrack::Result<DtClient> {
    let config = match &cli.config_file {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::from_env()?,
    };
    DtClient::from_config(&config)
}

async fn run(client: &DtClient, cli: Cli) -> dtrack::Result<()> {
    match cli.command {
        Command::Report(args) => handle_report(client, &args).await,
        Command::Get { entity, uuid } => handle_get(client, entity, &uuid, cli.json).await,
        Command::List {
            entity,
            project,
            search,
        } => handle_list(client, entity, project.as_deref(), search.as_deref(), cli.json).await,
        Command::Lookup { name, version } => {
            handle_lookup(client, &name, version.as_deref(), cli.json).await
        }
        Command::Upload(args) => handle_upload(client, &args, cli.json).await,
        Command::Delete { entity, uuid } => collection(client, entity).delete(Some(&uuid)).await,
    }
}

async fn handle_report(client: &DtClient, args: &ReportArgs) -> dtrack::Result<()> {
    let options = ExportOptions::from(args);
    let rows = report::export_to_file(client, &options, &args.output_file).await?;
    eprintln!("Wrote {rows} rows to {}", args.output_file.display());
    Ok(())
}

fn collection(client: &DtClient, entity: Entity) -> Resource {
    match entity {
        Entity::Project => client.project(),
        Entity::Component => client.component(),
        Entity::Service => client.service(),
    }
}

async fn handle_get(
    client: &DtClient,
    entity: Entity,
    uuid: &str,
    json: bool,
) -> dtrack::Result<()> {
    let items = collection(client, entity);
    let resource = items
        .get(uuid, None)
        .await?
        .ok_or_else(|| DtError::NotFound {
            url: format!("{}{}/{uuid}", client.base_url(), items.path()),
        })?;
    output_single(&resource, json)
}

async fn handle_list(
    client: &DtClient,
    entity: Entity,
    project: Option<&str>,
    search: Option<&str>,
    json: bool,
) -> dtrack::Result<()> {
    let query: Vec<(&str, &str)> = search.map(|s| vec![("searchText", s)]).unwrap_or_default();

    let items = match (entity, project) {
        (Entity::Project, _) => client.project().list(None, &query).await?,
        (Entity::Component | Entity::Service, Some(uuid)) => {
            let Some(project) = client.project().get(uuid, None).await? else {
                return Err(DtError::NotFound {
                    url: format!("{}project/{uuid}", client.base_url()),
                });
            };
            let scoped = if entity == Entity::Component {
                project.component()
            } else {
                project.service()
            };
            scoped.list(None, &query).await?
        }
        (_, None) => {
            eprintln!("Error: Components and services are listed per project");
            eprintln!("Hint: Use 'dtrack list {entity:?} --project <uuid>'");
            return Err(DtError::MissingIdentifier(
                "--project required for components and services".to_string(),
            ));
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        let rows: Vec<EntityRow> = items.iter().map(EntityRow::from).collect();
        println!("{}", Table::new(rows));
        println!("\n{} items", items.len());
    }
    Ok(())
}

async fn handle_lookup(
    client: &DtClient,
    name: &str,
    version: Option<&str>,
    json: bool,
) -> dtrack::Result<()> {
    let mut criteria = vec![("name", name)];
    if let Some(version) = version {
        criteria.push(("version", version));
    }
    match client.project().lookup(&criteria).await? {
        Some(project) => output_single(&project, json),
        None => Err(DtError::NotFound {
            url: format!("{}project/lookup", client.base_url()),
        }),
    }
}

async fn handle_upload(client: &DtClient, args: &UploadArgs, json: bool) -> dtrack::Result<()> {
    let target = match (&args.project, &args.project_name, &args.project_version) {
        (Some(uuid), _, _) => BomTarget::Uuid {
            project: uuid.clone(),
        },
        (None, Some(name), Some(version)) => BomTarget::Named {
            project_name: name.clone(),
            project_version: version.clone(),
        },
        _ => {
            return Err(DtError::MissingIdentifier(
                "--project or --project-name/--project-version required".to_string(),
            ))
        }
    };

    let mut upload = BomUpload::from_bytes(std::fs::read(&args.bom)?, target);
    if args.auto_create {
        upload = upload.auto_create(true);
    }

    let response = client.bom().upload(&upload).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.pretty_print());
    }
    Ok(())
}

fn output_single(resource: &Resource, json: bool) -> dtrack::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(resource.data())?);
    } else {
        println!("{}", resource.pretty_print());
    }
    Ok(())
}

// Table row type for non-JSON output

#[derive(Tabled)]
struct EntityRow {
    uuid: String,
    name: String,
    version: String,
    classifier: String,
    purl: String,
}

impl From<&dtrack::Entity> for EntityRow {
    fn from(e: &dtrack::Entity) -> Self {
        let text = |key: &str| e.str_field(key).unwrap_or_default().to_string();
        Self {
            uuid: text("uuid"),
            name: text("name"),
            version: text("version"),
            classifier: text("classifier"),
            purl: text("purl"),
        }
    }
}
