use std::fs;
use std::path::Path;
use std::time::Duration;

use clap::Parser;

use pix_report::auth::{CredentialProvider, FileCredentialProvider, HeadlessConsent, TokenStore};
use pix_report::cli::{Cli, Commands, ConfigAction, ConfigArgs, InitArgs, RunArgs};
use pix_report::config::{Config, ConfigLoader, FileConfigLoader};
use pix_report::mail::RestMailTransport;
use pix_report::net::{ProxyConfig, ReqwestClient};
use pix_report::pipeline::Pipeline;
use pix_report::{EXIT_AUTH_FAILURE, EXIT_RUNTIME_ERROR, EXIT_SUCCESS};

fn main() {
    let cli = Cli::parse();

    let exit_code = match &cli.command {
        None => run_pipeline(&RunArgs::default(), &cli),
        Some(Commands::Run(args)) => run_pipeline(args, &cli),
        Some(Commands::Init(args)) => run_init(args),
        Some(Commands::Config(args)) => run_config(args),
    };

    std::process::exit(exit_code);
}

fn run_pipeline(args: &RunArgs, cli: &Cli) -> i32 {
    // 1. Load configuration.
    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return EXIT_RUNTIME_ERROR;
        }
    };

    // 2. Resolve the proxy (explicit value, never a process-wide setting)
    //    and build the one HTTP client every stage shares.
    let proxy = resolve_proxy(&config, cli.quiet);
    let http = match ReqwestClient::new(
        Duration::from_secs(config.api.timeout_secs),
        proxy.as_ref(),
    ) {
        Ok(http) => http,
        Err(e) => {
            eprintln!("Error: {e}");
            return EXIT_RUNTIME_ERROR;
        }
    };

    // 3. Authenticate. Failure here terminates before any other work.
    let provider = FileCredentialProvider::new(
        TokenStore::new(config.mail.token_path.clone()),
        config.mail.credentials_path.clone(),
        &http,
        HeadlessConsent,
    );
    let credential = match provider.get_valid_credential() {
        Ok(credential) => {
            if !cli.quiet {
                println!("Authentication succeeded.");
            }
            credential
        }
        Err(e) => {
            eprintln!("Error: could not authenticate with the mail API: {e}");
            return EXIT_AUTH_FAILURE;
        }
    };

    // 4. Run the pipeline. A failed send still counts as completion; only
    //    fatal stage errors change the exit code.
    let transport = RestMailTransport::new(
        &http,
        &config.mail.send_base_url,
        &credential.access_token,
    );
    match Pipeline::new(&config, &http, &transport)
        .with_quiet(cli.quiet)
        .run()
    {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_RUNTIME_ERROR
        }
    }
}

fn load_config(config_path: Option<&Path>) -> pix_report::Result<Config> {
    let loader = FileConfigLoader::new();
    config_path.map_or_else(|| loader.load(), |path| loader.load_from_path(path))
}

fn resolve_proxy(config: &Config, quiet: bool) -> Option<ProxyConfig> {
    let settings = config.proxy.as_ref()?;
    let resolved = settings.resolve_from_env();
    if !quiet {
        if resolved.is_some() {
            println!("Proxy configured.");
        } else {
            println!("Proxy credentials not found in environment; connecting directly.");
        }
    }
    resolved
}

fn run_init(args: &InitArgs) -> i32 {
    match run_init_impl(args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_RUNTIME_ERROR
        }
    }
}

fn run_init_impl(args: &InitArgs) -> pix_report::Result<()> {
    let output_path = &args.output;

    if output_path.exists() && !args.force {
        return Err(pix_report::PixReportError::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            output_path.display()
        )));
    }

    let template = generate_config_template();
    fs::write(output_path, template)?;

    println!("Created configuration file: {}", output_path.display());
    Ok(())
}

fn generate_config_template() -> String {
    r#"# pix-report configuration file

[report]
# Periods to compare, most recent first (YYYYMM)
current_period = "202501"
previous_period = "202412"

# Series labels (derived from the periods when omitted)
# current_label = "Janeiro 2025"
# previous_label = "Dezembro 2024"

# Base name for rendered images: <basename>_fig1.png, <basename>_fig2.png
basename = "dashboard_pix"

[api]
# OData entity URL of the PIX statistics service
base_url = "https://olinda.bcb.gov.br/olinda/servico/Pix_DadosAbertos/versao/v1/odata/EstatisticasTransacoesPix"

# Row cap per period ($top)
top = 100

# Bounded timeout for every network call, in seconds
timeout_secs = 30

[mail]
sender = "sender@example.com"
recipients = ["recipient@example.com"]
subject = "PIX monthly comparison report"
body = "Monthly PIX comparison charts are embedded below."

# Logical user id for the mail API ("me" addresses the authenticated account)
user_id = "me"

# REST mail API base URL
send_base_url = "https://gmail.googleapis.com/gmail/v1"

# OAuth client-secret file and persisted token file
credentials_path = "credentials.json"
token_path = "token.json"

# Optional authenticated proxy. Credentials come from the PROXY_USERNAME
# and PROXY_PASSWORD environment variables; when either is missing the
# connection is direct.
# [proxy]
# host = "proxy.example.com"
# port = 8080
"#
    .to_string()
}

fn run_config(args: &ConfigArgs) -> i32 {
    match &args.action {
        ConfigAction::Validate { config } => run_config_validate(config),
        ConfigAction::Show { config, format } => run_config_show(config.as_deref(), format),
    }
}

fn run_config_validate(config_path: &Path) -> i32 {
    match FileConfigLoader::new().load_from_path(config_path) {
        Ok(_) => {
            println!("Configuration is valid: {}", config_path.display());
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Configuration error: {e}");
            EXIT_RUNTIME_ERROR
        }
    }
}

fn run_config_show(config_path: Option<&Path>, format: &str) -> i32 {
    match run_config_show_impl(config_path, format) {
        Ok(output) => {
            print!("{output}");
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_RUNTIME_ERROR
        }
    }
}

fn run_config_show_impl(config_path: Option<&Path>, format: &str) -> pix_report::Result<String> {
    let config = load_config(config_path)?;

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&config)?;
            Ok(format!("{json}\n"))
        }
        _ => Ok(format_config_text(&config)),
    }
}

fn format_config_text(config: &Config) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    output.push_str("=== Effective Configuration ===\n\n");

    output.push_str("[report]\n");
    let _ = writeln!(
        output,
        "  current_period = \"{}\" ({})",
        config.report.current_period,
        config.report.current_label()
    );
    let _ = writeln!(
        output,
        "  previous_period = \"{}\" ({})",
        config.report.previous_period,
        config.report.previous_label()
    );
    let _ = writeln!(output, "  basename = \"{}\"", config.report.basename);

    output.push_str("\n[api]\n");
    let _ = writeln!(output, "  base_url = \"{}\"", config.api.base_url);
    let _ = writeln!(output, "  top = {}", config.api.top);
    let _ = writeln!(output, "  timeout_secs = {}", config.api.timeout_secs);

    output.push_str("\n[mail]\n");
    let _ = writeln!(output, "  sender = \"{}\"", config.mail.sender);
    let _ = writeln!(output, "  recipients = {:?}", config.mail.recipients);
    let _ = writeln!(output, "  subject = \"{}\"", config.mail.subject);
    let _ = writeln!(output, "  user_id = \"{}\"", config.mail.user_id);
    let _ = writeln!(
        output,
        "  send_base_url = \"{}\"",
        config.mail.send_base_url
    );
    let _ = writeln!(
        output,
        "  credentials_path = \"{}\"",
        config.mail.credentials_path.display()
    );
    let _ = writeln!(
        output,
        "  token_path = \"{}\"",
        config.mail.token_path.display()
    );

    if let Some(proxy) = &config.proxy {
        output.push_str("\n[proxy]\n");
        let _ = writeln!(output, "  host = \"{}\"", proxy.host);
        let _ = writeln!(output, "  port = {}", proxy.port);
    }

    output
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
