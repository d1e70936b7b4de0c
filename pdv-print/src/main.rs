use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use pdv_print::{Config, PrintDispatcher, PrintManager, PrinterStore, init_logger_with_file};
use pdv_printer::discover_devices;
use shared::models::{DEFAULT_BAUD_RATE, DEFAULT_NETWORK_PORT, PrinterConfig, PrinterRole};

#[derive(Parser, Debug)]
#[command(name = "pdv-print", version, about = "ESC/POS printing for the PDV point of sale")]
struct Cli {
    /// Printer map, overrides PRINTERS_FILE
    #[arg(long, global = true, value_name = "PATH", env = "PRINTERS_FILE")]
    printers: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe every configured printer
    Status,
    /// Print a test page
    Test {
        /// kitchen | receipt | table (cozinha, caixa, mesa)
        role: PrinterRole,
    },
    /// List attached USB devices and serial ports
    Devices,
    /// Print a business object read from a JSON file
    Print {
        #[arg(value_enum)]
        kind: JobKind,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print a plain text file line by line
    Text {
        role: PrinterRole,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Assign a printer to a role and save the map
    Assign {
        role: PrinterRole,
        /// USB printer as VID:PID (hex)
        #[arg(long, value_name = "VID:PID", conflicts_with_all = ["network", "serial"])]
        usb: Option<String>,
        /// Network printer as HOST[:PORT]
        #[arg(long, value_name = "HOST[:PORT]", conflicts_with = "serial")]
        network: Option<String>,
        /// Serial printer device path
        #[arg(long, value_name = "PATH")]
        serial: Option<String>,
        #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
        baud: u32,
        #[arg(long)]
        name: Option<String>,
        /// Characters per line (48 for 80mm, 32 for 58mm)
        #[arg(long)]
        width: Option<usize>,
        #[arg(long, value_name = "MS")]
        timeout: Option<u64>,
    },
    /// Remove the printer of a role and save the map
    Unassign { role: PrinterRole },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum JobKind {
    Kitchen,
    Sale,
    Delivery,
    Table,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(path) = &cli.printers {
        config.printers_file = Some(path.display().to_string());
    }
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    let store = PrinterStore::new(config.printers_path());
    let dispatcher = Arc::new(PrintDispatcher::new(&config));
    dispatcher.load_printers(
        store
            .load()
            .with_context(|| format!("Failed to load {}", store.path().display()))?,
    );
    let manager = PrintManager::new(dispatcher.clone());

    match cli.command {
        Command::Status => {
            for probe in dispatcher.check_printer_service_status().await {
                match &probe.error {
                    None => println!("{:<8} {:<24} online", probe.role, probe.printer),
                    Some(e) => println!("{:<8} {:<24} offline ({})", probe.role, probe.printer, e),
                }
            }
            let status = manager.check_printers_status().await;
            println!("{}", serde_json::to_string_pretty(&status)?);
            if !status.available {
                std::process::exit(1);
            }
        }
        Command::Test { role } => {
            println!("{}", manager.print_test_page(role).await?);
        }
        Command::Devices => {
            let devices = discover_devices();
            println!("USB:");
            if devices.usb.is_empty() {
                println!("  (none)");
            }
            for dev in &devices.usb {
                let marker = if dev.is_printer { "*" } else { " " };
                println!(
                    " {} {:04x}:{:04x}  {}",
                    marker, dev.vendor_id, dev.product_id, dev.description
                );
            }
            println!("Serial:");
            if devices.serial_ports.is_empty() {
                println!("  (none)");
            }
            for port in &devices.serial_ports {
                println!("   {}", port);
            }
        }
        Command::Print { kind, file } => {
            let data = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let value: serde_json::Value = serde_json::from_str(&data)
                .with_context(|| format!("Invalid JSON in {}", file.display()))?;
            let message = match kind {
                JobKind::Kitchen => manager.print_for_kitchen(&value).await?,
                JobKind::Sale => manager.print_sale_receipt(&value).await?,
                JobKind::Delivery => manager.print_delivery_order(&value).await?,
                JobKind::Table => manager.print_table_order(&value).await?,
            };
            println!("{}", message);
        }
        Command::Text { role, file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            println!("{}", manager.print_simple_text(&text, role).await?);
        }
        Command::Assign {
            role,
            usb,
            network,
            serial,
            baud,
            name,
            width,
            timeout,
        } => {
            let mut printer = match (usb, network, serial) {
                (Some(ids), None, None) => {
                    let Some((vid, pid)) = ids.split_once(':') else {
                        bail!("USB printer must be given as VID:PID, got {}", ids);
                    };
                    PrinterConfig::usb(vid, pid)
                }
                (None, Some(addr), None) => match addr.rsplit_once(':') {
                    Some((host, port)) => {
                        let port = port
                            .parse()
                            .with_context(|| format!("Invalid port in {}", addr))?;
                        PrinterConfig::network(host, port)
                    }
                    None => PrinterConfig::network(addr, DEFAULT_NETWORK_PORT),
                },
                (None, None, Some(path)) => PrinterConfig::serial(path, baud),
                _ => bail!("Give exactly one of --usb, --network or --serial"),
            };
            if let Some(name) = name {
                printer = printer.with_name(name);
            }
            if let Some(width) = width {
                printer = printer.with_paper_width(width);
            }
            if let Some(ms) = timeout {
                printer = printer.with_timeout_ms(ms);
            }
            pdv_print::printing::endpoint_for(&printer)?;

            dispatcher.set_printer(role, printer);
            store.save(&dispatcher.printers())?;
            println!("{} -> {}", role, store.path().display());
        }
        Command::Unassign { role } => {
            if dispatcher.remove_printer(role).is_none() {
                bail!("No printer assigned to {}", role);
            }
            store.save(&dispatcher.printers())?;
            println!("{} removed", role);
        }
    }

    Ok(())
}
