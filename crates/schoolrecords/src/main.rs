//! `schoolrec` - CLI for schoolrecords
//!
//! This binary runs the school records web server and inspects or moves the
//! stored records from the command line.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use schoolrecords::cli::{
    output, Cli, Command, ConfigCommand, ExportCommand, ImportCommand, MarksCommand,
    ServeCommand, StudentsCommand, TeachersCommand,
};
use schoolrecords::dashboard::{DashboardSummary, StudentReport};
use schoolrecords::exchange::{self, ExportBundle};
use schoolrecords::{init_logging, Config, Error, SchoolDatabase};

type CliResult = anyhow::Result<()>;

fn main() -> CliResult {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    // Execute the command
    match cli.command {
        Command::Serve(cmd) => handle_serve(config, &cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Students(cmd) => handle_students(&config, &cmd),
        Command::Teachers(cmd) => handle_teachers(&config, &cmd),
        Command::Marks(cmd) => handle_marks(&config, &cmd),
        Command::Export(cmd) => handle_export(&config, &cmd),
        Command::Import(cmd) => handle_import(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_serve(mut config: Config, cmd: &ServeCommand) -> CliResult {
    if let Some(host) = &cmd.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    config.validate()?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(schoolrecords::server::serve(config))?;
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> CliResult {
    let db = SchoolDatabase::from_config(config)?;
    let stats = db.stats();
    let summary = DashboardSummary::compute(&db);

    if json {
        let status = serde_json::json!({
            "dataDir": db.root(),
            "stats": stats,
            "dashboard": summary,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("schoolrec status");
        println!("----------------");
        println!("Data dir:      {}", db.root().display());
        println!("Disk usage:    {} bytes", stats.disk_bytes);
        print!("{}", output::dashboard(&summary));
    }
    Ok(())
}

fn handle_students(config: &Config, cmd: &StudentsCommand) -> CliResult {
    let mut db = SchoolDatabase::from_config(config)?;
    match cmd {
        StudentsCommand::List { format, .. } => {
            let query = cmd.query().unwrap_or_default();
            print!("{}", output::students(&query.run(db.students()), *format)?);
        }
        StudentsCommand::Show { id, json } => {
            let report =
                StudentReport::build(&db, id).ok_or_else(|| Error::not_found("student", id))?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", output::report(&report));
            }
        }
        StudentsCommand::Delete { id } => {
            if db.delete_student(id)? {
                println!("Deleted student {id}");
            } else {
                return Err(Error::not_found("student", id).into());
            }
        }
    }
    Ok(())
}

fn handle_teachers(config: &Config, cmd: &TeachersCommand) -> CliResult {
    let db = SchoolDatabase::from_config(config)?;
    let TeachersCommand::List { format, .. } = cmd;
    print!("{}", output::teachers(&cmd.query().run(db.teachers()), *format)?);
    Ok(())
}

fn handle_marks(config: &Config, cmd: &MarksCommand) -> CliResult {
    let db = SchoolDatabase::from_config(config)?;
    let MarksCommand::List { format, .. } = cmd;
    print!("{}", output::marks(&cmd.query().run(db.marks()), *format)?);
    Ok(())
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> CliResult {
    let db = SchoolDatabase::from_config(config)?;
    let bundle = ExportBundle::from_db(&db);
    match &cmd.output {
        Some(path) => {
            bundle
                .write(path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Exported {} students, {} teachers, {} marks to {}",
                bundle.students.len(),
                bundle.teachers.len(),
                bundle.marks.len(),
                path.display()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&bundle)?),
    }
    Ok(())
}

fn handle_import(config: &Config, cmd: &ImportCommand) -> CliResult {
    let mut db = SchoolDatabase::from_config(config)?;
    let bundle = ExportBundle::read(&cmd.file)
        .with_context(|| format!("failed to read bundle {}", cmd.file.display()))?;
    let summary = exchange::import(&mut db, bundle, cmd.mode())?;
    println!(
        "Imported {}: now {} students, {} teachers, {} marks",
        cmd.file.display(),
        summary.students,
        summary.teachers,
        summary.marks
    );
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> CliResult {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data dir:           {}", config.data_dir().display());
                println!("  Pretty JSON:        {}", config.storage.pretty_json);
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
                println!(
                    "  Static dir:         {}",
                    config
                        .server
                        .static_dir
                        .as_ref()
                        .map_or_else(|| "(none)".to_string(), |d| d.display().to_string())
                );
                println!("  Max body bytes:     {}", config.server.max_body_bytes);
                println!("  Permissive CORS:    {}", config.server.cors_permissive);
                println!();
                println!("[School]");
                println!("  Name:               {}", config.school.name);
                println!("  Address:            {}", config.school.address);
                println!("  Phone:              {}", config.school.phone);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
