use super::render::{
    print_car, print_cars, print_info, print_load_report, print_message, print_messages,
    print_success,
};
use super::setup::{AddArgs, Cli, Commands, MessageCommands, UpdateArgs};
use autosalon::config::{AutosalonConfig, Gate, CONFIG_FILE_NAME};
use autosalon::error::{AutosalonError, Result};
use autosalon::messages::Inbox;
use autosalon::model::pinned_first;
use autosalon::repository::CarRepository;
use autosalon::store::fs_backend::FsSlots;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

struct AppContext {
    config: AutosalonConfig,
    repo: CarRepository<FsSlots>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(cli))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        "autosalon=debug"
    } else {
        "autosalon=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            local.exists().then_some(local)
        }
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let path = config_path(cli.config.as_deref());
    if let Some(path) = &path {
        if !path.exists() {
            return Err(AutosalonError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
    }
    let config = AutosalonConfig::load(path.as_deref())?;
    let repo = CarRepository::from_config(&config);
    Ok(AppContext { config, repo })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let ctx = init_context(&cli)?;

    match cli.command {
        None => handle_list(&ctx, false).await,
        Some(Commands::List { newest }) => handle_list(&ctx, newest).await,
        Some(Commands::Featured) => handle_featured(&ctx).await,
        Some(Commands::Show { id }) => handle_show(&ctx, &id).await,
        Some(Commands::Add(args)) => handle_add(&ctx, &args).await,
        Some(Commands::Update { id, fields }) => handle_update(&ctx, &id, &fields).await,
        Some(Commands::Delete { id }) => handle_delete(&ctx, &id).await,
        Some(Commands::Owner { id, user }) => handle_owner(&ctx, &id, &user).await,
        Some(Commands::Reset) => handle_reset(&ctx),
        Some(Commands::Clear) => handle_clear(&ctx),
        Some(Commands::Messages(cmd)) => handle_messages(&ctx, cmd).await,
        Some(Commands::Status) => handle_status(&ctx),
    }
}

async fn load(ctx: &AppContext) {
    let report = ctx.repo.load().await;
    print_load_report(&report);
}

async fn handle_list(ctx: &AppContext, newest: bool) -> Result<()> {
    load(ctx).await;
    let cars = ctx.repo.cars();
    if newest {
        print_cars(&cars);
    } else {
        print_cars(&pinned_first(&cars));
    }
    Ok(())
}

async fn handle_featured(ctx: &AppContext) -> Result<()> {
    load(ctx).await;
    print_cars(&ctx.repo.featured());
    Ok(())
}

async fn handle_show(ctx: &AppContext, id: &str) -> Result<()> {
    load(ctx).await;
    match ctx.repo.get(id) {
        Some(car) => {
            print_car(&car);
            Ok(())
        }
        None => Err(AutosalonError::Api(format!("Car not found: {}", id))),
    }
}

async fn handle_add(ctx: &AppContext, args: &AddArgs) -> Result<()> {
    let car = args.to_new_car();
    car.validate_for_listing()?;
    load(ctx).await;
    let created = ctx.repo.create(car, args.owner.as_deref()).await?;
    print_success(&format!("Added {} ({})", created.name, created.id));
    Ok(())
}

async fn handle_update(ctx: &AppContext, id: &str, fields: &UpdateArgs) -> Result<()> {
    let patch = fields.to_patch();
    if patch.is_empty() {
        return Err(AutosalonError::Api("Nothing to update".to_string()));
    }
    load(ctx).await;
    ctx.repo.update(id, &patch).await?;
    print_success(&format!("Updated {}", id));
    Ok(())
}

async fn handle_delete(ctx: &AppContext, id: &str) -> Result<()> {
    load(ctx).await;
    ctx.repo.delete(id).await?;
    print_success(&format!("Deleted {}", id));
    Ok(())
}

async fn handle_owner(ctx: &AppContext, id: &str, user: &str) -> Result<()> {
    if ctx.repo.check_ownership(id, user).await {
        print_success(&format!("{} may edit {}", user, id));
    } else {
        print_info(&format!("{} did not create {}", user, id));
    }
    Ok(())
}

fn handle_reset(ctx: &AppContext) -> Result<()> {
    let cars = ctx.repo.reset_to_seed()?;
    print_success(&format!("Local storage reset to {} demo cars", cars.len()));
    Ok(())
}

fn handle_clear(ctx: &AppContext) -> Result<()> {
    ctx.repo.clear_local()?;
    print_success("Local car storage cleared");
    Ok(())
}

fn handle_status(ctx: &AppContext) -> Result<()> {
    match Gate::resolve(&ctx.config) {
        Gate::Remote(settings) if ctx.repo.is_remote() => {
            println!("Provider: {} ({})", settings.kind, settings.url);
        }
        _ => {
            println!("Provider: none (local storage)");
        }
    }
    println!("Storage:  {}", ctx.config.storage_dir().display());
    Ok(())
}

async fn handle_messages(ctx: &AppContext, cmd: MessageCommands) -> Result<()> {
    let inbox = Inbox::from_config(&ctx.config);
    match cmd {
        MessageCommands::List => {
            inbox.load().await?;
            print_messages(&inbox.messages(), inbox.unread());
        }
        MessageCommands::Open { id } => {
            inbox.load().await?;
            match inbox.open(&id).await? {
                Some(message) => print_message(&message),
                None => {
                    return Err(AutosalonError::Api(format!("Message not found: {}", id)));
                }
            }
        }
        MessageCommands::Delete { id } => {
            inbox.delete(&id).await?;
            print_success(&format!("Deleted message {}", id));
        }
        MessageCommands::Count => {
            let total = inbox.count_total().await;
            let unread = inbox.count_unread().await;
            println!("{} messages, {} unread", total, unread);
        }
    }
    Ok(())
}
