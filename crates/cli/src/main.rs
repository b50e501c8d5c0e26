use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, CommandFactory, Parser, Subcommand};
use dialoguer::Password;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use wpimport_core::{
    BlogClient, Channel, ClientConfig, DEFAULT_INSTANCE, DryRunClient, ImportConfig, ImportReport, Instance,
    InstanceStore, Session, WriteFreelyClient, detect_source, read_file, read_stdin, run_import, transform_post,
};

mod echo;

use echo::Status;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Profile name used by --remember when --profile is not given
const DEFAULT_PROFILE: &str = "writeas";

/// Import WordPress exports into Write.as and WriteFreely
#[derive(Parser, Debug)]
#[command(name = "wp-import")]
#[command(author = "wp-import Contributors")]
#[command(version)]
#[command(about = "Import WordPress exports into Write.as and WriteFreely", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload the posts in an export to an instance
    Import(ImportArgs),
    /// Convert an export to JSON without uploading anything
    Convert(ConvertArgs),
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// WordPress export (WXR) file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Alias of the existing blog to import into
    #[arg(short, long, value_name = "ALIAS", conflicts_with = "new_blogs", required_unless_present = "new_blogs")]
    blog: Option<String>,

    /// Create a new blog for every channel in the export
    #[arg(long)]
    new_blogs: bool,

    /// Username to sign in with
    #[arg(short, long, value_name = "USER")]
    user: Option<String>,

    /// Instance address (default: https://write.as)
    #[arg(short, long, value_name = "URL")]
    instance: Option<String>,

    /// Saved instance profile to use
    #[arg(long, value_name = "NAME")]
    profile: Option<String>,

    /// Save the access token under the profile name after signing in
    #[arg(long)]
    remember: bool,

    /// Instance store location (default: <config dir>/wp-import/instances.ini)
    #[arg(long, value_name = "PATH")]
    instances: Option<PathBuf>,

    /// Convert everything but do not upload
    #[arg(short, long)]
    dry_run: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// WordPress export (WXR) file, or "-" for stdin
    #[arg(short, long, value_name = "FILE")]
    file: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "wpimport_core=debug,wp_import=debug" } else { "wpimport_core=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        echo::print_banner();
        echo::status(Status::Info, "Debug logging enabled");
        eprintln!();
    }

    let result = match cli.command {
        Command::Import(args) => import(&args, cli.verbose).await,
        Command::Convert(args) => convert(args, cli.verbose),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "wp-import", &mut io::stdout());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            echo::status(Status::Fail, &format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Read and parse an export, from a file or stdin ("-")
fn load_channels(input: &str, verbose: bool) -> anyhow::Result<Vec<Channel>> {
    let (path, raw) = if input == "-" {
        if verbose {
            echo::print_step(1, 3, "Reading from stdin");
        }
        (None, read_stdin().context("Failed to read from stdin")?)
    } else {
        if verbose {
            echo::print_step(1, 3, &format!("Reading from file {}", input.bright_white()));
        }
        let path = Path::new(input);
        (Some(path), read_file(path).with_context(|| format!("Failed to read file: {}", input))?)
    };

    if verbose {
        eprintln!("  {} {} bytes", "Size:".dimmed(), raw.len().to_string().bright_white());
        echo::print_step(2, 3, "Parsing export");
    }

    let adapter = detect_source(path, &raw).context("Cannot import this file")?;
    let channels = adapter
        .read(&raw)
        .with_context(|| format!("Failed to parse {} export", adapter.name()))?;

    if verbose {
        let items: usize = channels.iter().map(|c| c.items.len()).sum();
        eprintln!(
            "  {} {} channels, {} items",
            "Found:".dimmed(),
            channels.len().to_string().bright_white(),
            items.to_string().bright_white()
        );
    }

    Ok(channels)
}

async fn import(args: &ImportArgs, verbose: bool) -> anyhow::Result<()> {
    let channels = load_channels(&args.file.to_string_lossy(), verbose)?;

    let config = match &args.blog {
        Some(alias) => ImportConfig::blog(alias.clone()),
        None => ImportConfig::new_blogs(),
    };

    if verbose {
        echo::print_step(3, 3, "Importing posts");
    }

    let report = if args.dry_run {
        echo::status(Status::Info, "Dry run: nothing will be uploaded");
        upload(&DryRunClient, &channels, &config).await?
    } else {
        let (session, sign_out) = connect(args).await?;
        let result = upload(&session, &channels, &config).await;

        if sign_out {
            if let Err(e) = session.sign_out().await {
                echo::status(Status::Warn, &format!("Sign out failed: {}", e));
            }
        }

        result?
    };

    print_report(&report);
    Ok(())
}

async fn upload<C>(client: &C, channels: &[Channel], config: &ImportConfig) -> anyhow::Result<ImportReport>
where
    C: BlogClient + ?Sized,
{
    run_import(client, channels, config).await.context("Import failed")
}

/// Returns the session and whether it should be signed out afterwards.
///
/// Sessions resumed from a saved token, or saved with --remember, stay valid.
async fn connect(args: &ImportArgs) -> anyhow::Result<(Session, bool)> {
    let client_config = ClientConfig { timeout: args.timeout, ..Default::default() };
    let store_path = match &args.instances {
        Some(path) => path.clone(),
        None => InstanceStore::default_path()?,
    };
    let mut store = InstanceStore::load(&store_path).context("Failed to load saved instances")?;

    let saved = args
        .profile
        .as_deref()
        .and_then(|name| store.get(name))
        .filter(|instance| !instance.token.is_empty())
        .cloned();

    if let Some(saved) = saved {
        let instance = args
            .instance
            .as_deref()
            .or_else(|| Some(saved.url.as_str()).filter(|url| !url.is_empty()));
        let client = WriteFreelyClient::new(instance, &client_config)?;
        tracing::info!(instance = %client.api_url(), "using saved token");
        return Ok((client.with_token(saved.token), false));
    }

    let user = args
        .user
        .as_deref()
        .context("A username is required (-u USER), or --profile with a saved token")?;
    let password = Password::new()
        .with_prompt(format!("Password for {}", user))
        .interact()
        .context("Failed to read password")?;

    let client = WriteFreelyClient::new(args.instance.as_deref(), &client_config)?;
    let session = client.sign_in(user, &password).await.context("Sign in failed")?;
    echo::status(Status::Done, &format!("Signed in as {}", session.username().unwrap_or(user)));

    if args.remember {
        let profile = args.profile.as_deref().unwrap_or(DEFAULT_PROFILE);
        let url = args.instance.clone().unwrap_or_else(|| DEFAULT_INSTANCE.to_string());
        store.insert(profile, Instance { url, token: session.token().to_string() });
        store
            .save(&store_path)
            .with_context(|| format!("Failed to save {}", store_path.display()))?;
        echo::status(Status::Info, &format!("Saved token as profile {}", profile.bright_white()));
        return Ok((session, false));
    }

    Ok((session, true))
}

fn print_report(report: &ImportReport) {
    echo::print_summary(report);
    println!("Created {} posts.", report.posts_created);
}

fn convert(args: ConvertArgs, verbose: bool) -> anyhow::Result<()> {
    let channels = load_channels(&args.file, verbose)?;

    if verbose {
        echo::print_step(3, 3, "Converting posts");
    }

    let mut output = Vec::new();
    for channel in &channels {
        let mut posts = Vec::new();
        for item in &channel.items {
            match transform_post(item, &channel.language, "") {
                Ok(Some(post)) => posts.push(post),
                Ok(None) => {}
                Err(e) => echo::status(Status::Warn, &format!("Failed {}: {}", item.title, e)),
            }
        }

        output.push(serde_json::json!({
            "title": channel.title,
            "description": channel.description,
            "link": channel.link,
            "language": channel.language,
            "posts": posts,
        }));
    }

    let json = serde_json::to_string_pretty(&output).context("Failed to serialize posts")?;

    match args.output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::status(Status::Done, &format!("Output written to {}", path.display().bright_white()));
        }
        None => println!("{}", json),
    }

    Ok(())
}
