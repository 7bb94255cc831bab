//! Card fields sandbox CLI
//!
//! Exercises the SDK from the command line: brand detection, card input
//! validation, style sanitization, and live submits against a processor
//! REST API.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use card_brands::{BrandCode, CardVendor};
use cardfields_api::ProcessorClient;
use cardfields_core::styles::{self, RawStyle};
use cardfields_core::{CardFieldsService, FormRegistry, SubmitOptions};
use cardfields_types::constants::{
    ALLOWED_ATTRIBUTES, FieldLayout, OPTIONAL_CARD_FIELDS, default_placeholder,
};
use cardfields_types::{
    Approval, CallbackError, CardProps, FeatureFlags, FieldKind, Intent, ProcessorGateway,
    SubmitError,
};

#[derive(Parser)]
#[command(name = "cardfields")]
#[command(author, version, about = "Card fields SDK sandbox", long_about = None)]
struct Cli {
    /// Base URL of the processor REST API
    #[arg(
        long,
        env = "CARDFIELDS_API_URL",
        default_value = "http://localhost:3000"
    )]
    processor_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Brand metadata and detection
    Brand {
        #[command(subcommand)]
        action: BrandCommands,
    },
    /// Per-field form configuration: placeholders, masks, attributes
    Fields {
        /// Zero-pad single-digit months in the expiry mask
        #[arg(long)]
        zero_padded_expiry: bool,
    },
    /// Validate card input without submitting it
    Validate {
        /// Card number, spaces and dashes welcome
        #[arg(long)]
        number: String,
        /// Expiry, e.g. "09/27"
        #[arg(long)]
        expiry: String,
        /// Security code
        #[arg(long)]
        cvv: String,
        /// Cardholder name
        #[arg(long)]
        name: Option<String>,
        /// Postal code
        #[arg(long)]
        postal: Option<String>,
        /// Treat an empty postal code as an error
        #[arg(long)]
        require_postal: bool,
        /// Vendors the merchant accepts (comma-separated, e.g. VISA,AMEX)
        #[arg(long, value_delimiter = ',', default_value = "")]
        vendors: Vec<String>,
    },
    /// Default stylesheets and style sanitization
    Style {
        #[command(subcommand)]
        action: StyleCommands,
    },
    /// Submit card fields through a flow
    Submit {
        #[command(subcommand)]
        action: SubmitCommands,
    },
}

#[derive(Subcommand)]
enum BrandCommands {
    /// List every known brand profile
    List,
    /// Detect the brand of a card number
    Detect {
        /// Card number or prefix
        number: String,
    },
}

#[derive(Subcommand)]
enum StyleCommands {
    /// Print the default stylesheet for a layout
    Defaults {
        /// Form layout: single or multi
        #[arg(long, default_value = "multi")]
        layout: String,
    },
    /// Sanitize a JSON style object and print the surviving CSS
    Check {
        /// Path to a JSON file of selector -> { property: value }
        file: std::path::PathBuf,
    },
}

#[derive(Subcommand)]
enum SubmitCommands {
    /// Confirm an existing order with the entered card
    Purchase {
        /// Order id your server created
        #[arg(long)]
        order: String,
        /// Facilitator OAuth access token
        #[arg(long, env = "CARDFIELDS_ACCESS_TOKEN")]
        access_token: String,
        /// Partner attribution id sent with the confirmation
        #[arg(long, default_value = "")]
        attribution: String,
        /// Integrator client id
        #[arg(long, env = "CARDFIELDS_CLIENT_ID")]
        client_id: String,
        #[arg(long)]
        number: String,
        #[arg(long)]
        expiry: String,
        #[arg(long)]
        cvv: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        postal: Option<String>,
    },
    /// Attach the entered card to an existing vault setup token
    Vault {
        /// Setup token your server created
        #[arg(long)]
        setup_token: String,
        /// Integrator client id
        #[arg(long, env = "CARDFIELDS_CLIENT_ID")]
        client_id: String,
        /// Buyer id token forwarded to the processor
        #[arg(long, env = "CARDFIELDS_ID_TOKEN")]
        id_token: Option<String>,
        #[arg(long)]
        number: String,
        #[arg(long)]
        expiry: String,
        #[arg(long)]
        cvv: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        postal: Option<String>,
    },
}

fn parse_vendor(s: &str) -> Result<CardVendor> {
    match s.to_uppercase().as_str() {
        "AMEX" => Ok(CardVendor::Amex),
        "DISCOVER" => Ok(CardVendor::Discover),
        "ELO" => Ok(CardVendor::Elo),
        "HIPER" => Ok(CardVendor::Hiper),
        "JCB" => Ok(CardVendor::Jcb),
        "MASTERCARD" => Ok(CardVendor::Mastercard),
        "CUP" => Ok(CardVendor::Cup),
        "VISA" => Ok(CardVendor::Visa),
        _ => anyhow::bail!(
            "Unknown vendor: {}. Supported: AMEX, DISCOVER, ELO, HIPER, JCB, MASTERCARD, CUP, VISA",
            s
        ),
    }
}

fn parse_layout(s: &str) -> Result<FieldLayout> {
    match s.to_lowercase().as_str() {
        "single" => Ok(FieldLayout::Single),
        "multi" => Ok(FieldLayout::Multi),
        _ => anyhow::bail!("Unknown layout: {}. Supported: single, multi", s),
    }
}

/// Builds a form with the required fields mounted and filled, plus name
/// and postal when given.
fn mounted_form(
    number: &str,
    expiry: &str,
    cvv: &str,
    name: Option<&str>,
    postal: Option<&str>,
) -> Arc<FormRegistry> {
    let registry = Arc::new(FormRegistry::new());
    for field in FieldKind::required() {
        registry.mount(*field);
    }
    registry.set_value(FieldKind::Number, number);
    registry.set_value(FieldKind::Expiry, expiry);
    registry.set_value(FieldKind::Cvv, cvv);
    if let Some(name) = name {
        registry.mount(FieldKind::Name);
        registry.set_value(FieldKind::Name, name);
    }
    if let Some(postal) = postal {
        registry.mount(FieldKind::Postal);
        registry.set_value(FieldKind::Postal, postal);
    }
    registry
}

async fn run_submit<G: ProcessorGateway>(
    service: &CardFieldsService<G>,
    options: SubmitOptions,
) -> Result<()> {
    match service.submit(options).await {
        Ok(Approval::Purchase { order_id }) => {
            println!("✓ order {} confirmed", order_id);
        }
        Ok(Approval::Vault { vault_setup_token }) => {
            println!("✓ card attached to setup token {}", vault_setup_token);
        }
        Err(error) => {
            eprintln!("✗ {}", error);
            if let SubmitError::InvalidCard { errors } = &error {
                for field_error in errors {
                    eprintln!("  {}", field_error);
                }
            }
            for field in FieldKind::all() {
                let codes = service.registry().field_api_errors(*field);
                if !codes.is_empty() {
                    eprintln!("  {}: {:?}", field, codes);
                }
            }
            let form = service.registry().form_api_errors();
            if !form.is_empty() {
                eprintln!("  form: {:?}", form);
            }
            std::process::exit(1);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cardfields_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Brand { action } => match action {
            BrandCommands::List => {
                let profiles: Vec<_> =
                    BrandCode::all().iter().map(|brand| brand.profile()).collect();
                println!("{}", serde_json::to_string_pretty(&profiles)?);
            }
            BrandCommands::Detect { number } => {
                let digits = card_brands::normalize(&number);
                let detected = card_brands::detect(&digits);
                let profile = card_brands::profile_or_default(detected);
                let report = serde_json::json!({
                    "brand": profile.code,
                    "nice_name": profile.nice_name,
                    "vendor": detected.map(|brand| brand.vendor().to_string()),
                    "luhn_valid": card_brands::luhn_valid(&digits),
                    "display": card_brands::format_with_gaps(&digits, profile.gaps),
                    "security_code": profile.security_code,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        },

        Commands::Fields { zero_padded_expiry } => {
            let flags = FeatureFlags {
                zero_padded_expiry,
                ..FeatureFlags::default()
            };
            let fields: Vec<_> = FieldKind::all()
                .iter()
                .map(|&field| {
                    serde_json::json!({
                        "field": field,
                        "placeholder": default_placeholder(field),
                        "required": FieldKind::required().contains(&field),
                        "may_be_left_empty": OPTIONAL_CARD_FIELDS.contains(&field),
                        "mask": (field == FieldKind::Expiry).then(|| flags.expiry_mask()),
                    })
                })
                .collect();
            let report = serde_json::json!({
                "fields": fields,
                "allowed_attributes": ALLOWED_ATTRIBUTES,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Validate {
            number,
            expiry,
            cvv,
            name,
            postal,
            require_postal,
            vendors,
        } => {
            let registry = mounted_form(&number, &expiry, &cvv, name.as_deref(), postal.as_deref());
            let vendors: Vec<CardVendor> = vendors
                .iter()
                .filter(|v| !v.is_empty())
                .map(|v| parse_vendor(v))
                .collect::<Result<_>>()?;
            if !vendors.is_empty() {
                registry.set_eligible_vendors(vendors);
            }
            let flags = FeatureFlags {
                require_postal_code: require_postal,
                ..FeatureFlags::default()
            };
            match registry.extract_card(flags) {
                Ok(card) => {
                    let brand = card_brands::detect(&card.number);
                    let report = serde_json::json!({
                        "valid": true,
                        "brand": card_brands::profile_or_default(brand).code,
                        "last_four": card.last_four(),
                        "expiry": card.expiry.to_wire(),
                    });
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                Err(errors) => {
                    let report = serde_json::json!({
                        "valid": false,
                        "errors": errors,
                    });
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    std::process::exit(1);
                }
            }
        }

        Commands::Style { action } => match action {
            StyleCommands::Defaults { layout } => {
                let layout = parse_layout(&layout)?;
                print!("{}", styles::default_sheet(layout));
            }
            StyleCommands::Check { file } => {
                let raw = std::fs::read_to_string(&file)?;
                let style: RawStyle = serde_json::from_str(&raw)?;
                let rules = styles::sanitize_style(&style);
                if rules.len() < style.len() {
                    eprintln!("✗ {} rule(s) dropped by sanitization", style.len() - rules.len());
                }
                print!("{}", styles::render_rules(&rules));
            }
        },

        Commands::Submit { action } => match action {
            SubmitCommands::Purchase {
                order,
                access_token,
                attribution,
                client_id,
                number,
                expiry,
                cvv,
                name,
                postal,
            } => {
                let registry =
                    mounted_form(&number, &expiry, &cvv, name.as_deref(), postal.as_deref());
                let props = CardProps::builder(client_id)
                    .create_order(move || {
                        let order = order.clone();
                        async move { Ok::<_, CallbackError>(order) }
                    })
                    .on_error(|error: SubmitError| async move {
                        tracing::debug!("on_error callback: {error}");
                    })
                    .build()?;
                let gateway = ProcessorClient::new(&cli.processor_url);
                let service = CardFieldsService::new(gateway, registry, props);

                let mut options = SubmitOptions::new(access_token);
                options.partner_attribution_id = attribution;
                run_submit(&service, options).await?;
            }
            SubmitCommands::Vault {
                setup_token,
                client_id,
                id_token,
                number,
                expiry,
                cvv,
                name,
                postal,
            } => {
                let registry =
                    mounted_form(&number, &expiry, &cvv, name.as_deref(), postal.as_deref());
                let mut builder = CardProps::builder(client_id)
                    .intent(Intent::Save)
                    .create_vault_setup_token(move || {
                        let setup_token = setup_token.clone();
                        async move { Ok::<_, CallbackError>(setup_token) }
                    })
                    .on_approve(|_approval: Approval| async move { Ok::<_, CallbackError>(()) })
                    .on_error(|error: SubmitError| async move {
                        tracing::debug!("on_error callback: {error}");
                    });
                if let Some(id_token) = id_token {
                    builder = builder.user_id_token(id_token);
                }
                let props = builder.build()?;
                let gateway = ProcessorClient::new(&cli.processor_url);
                let service = CardFieldsService::new(gateway, registry, props);

                // The vault flow authenticates with the client id and the
                // buyer id token, not a facilitator token.
                run_submit(&service, SubmitOptions::new("")).await?;
            }
        },
    }

    Ok(())
}
