// src/bin/console.rs

// Client console de la flotte : envoie une requête au serveur et affiche la réponse
use drone_fleet::config::{Command, ConsoleArgs};
use drone_fleet::field::Field;
use drone_fleet::history::HistoryEntry;
use drone_fleet::network::{Client, DroneResponse, ErrorResponse, Request, Response, ResponseBody};
use drone_fleet::registry::DroneRecord;
use drone_fleet::types::DroneState;

use clap::Parser;
use crossterm::{
    ExecutableCommand,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{Write, stdout};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ConsoleArgs::parse();

    // NOTE - Connect to fleet server
    let mut client = match Client::connect(args.server.as_str()).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Erreur de connexion au serveur {}: {}", args.server, e);
            eprintln!("🚀 Démarrez-le avec: cargo run --bin fleet-server");
            return Err(e.into());
        }
    };

    let request = match args.command {
        Command::Register { x, y, direction } => Request::Register { x, y, direction },
        Command::Move { id, x, y } => Request::Move { drone_id: id, x, y },
        Command::Get(drone) => Request::Get { drone_id: drone.id },
        Command::History(drone) => Request::History { drone_id: drone.id },
        Command::Field => Request::List,
    };

    match client.send(&request).await? {
        Response::Ok { body } => render_body(body)?,
        Response::Error { error } => {
            render_error(&error)?;
            std::process::exit(1);
        }
    }
    Ok(())
}

fn render_body(body: ResponseBody) -> std::io::Result<()> {
    match body {
        ResponseBody::Drone(drone) => render_drone(&drone),
        ResponseBody::Moved(entry) => render_entry(&entry),
        ResponseBody::History(entries) => {
            for (i, entry) in entries.iter().enumerate() {
                colored(Color::DarkGrey, &format!("#{} ", i))?;
                render_entry(entry)?;
            }
            Ok(())
        }
        ResponseBody::Fleet(fleet) => {
            let records: Vec<DroneRecord> = fleet
                .iter()
                .map(|d| DroneRecord {
                    id: d.drone_id,
                    state: DroneState::new(d.x, d.y, d.direction),
                })
                .collect();
            Field::from_records(&records).display()?;
            for drone in &fleet {
                render_drone(drone)?;
            }
            Ok(())
        }
    }
}

fn render_drone(drone: &DroneResponse) -> std::io::Result<()> {
    colored(Color::Cyan, &format!("{} ", drone.drone_id))?;
    println!("({}, {}) {}", drone.x, drone.y, drone.direction);
    Ok(())
}

fn render_entry(entry: &HistoryEntry) -> std::io::Result<()> {
    colored(Color::Cyan, &format!("{} ", entry.drone_id))?;
    println!("({}, {}) {}", entry.x, entry.y, entry.direction);
    for line in &entry.details {
        colored(Color::Green, "    → ")?;
        println!("{}", line);
    }
    Ok(())
}

fn render_error(error: &ErrorResponse) -> std::io::Result<()> {
    colored(Color::Red, &format!("✗ {} ({})\n", error.message, error.status))?;
    for detail in &error.details {
        println!("    {}", detail);
    }
    Ok(())
}

fn colored(color: Color, text: &str) -> std::io::Result<()> {
    let mut stdout = stdout();
    stdout.execute(SetForegroundColor(color))?;
    stdout.execute(Print(text))?;
    stdout.execute(ResetColor)?;
    stdout.flush()
}
