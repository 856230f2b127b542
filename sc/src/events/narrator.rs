//! Narrator - renders workshop events to the console
//!
//! The narrator subscribes to the EventBus and prints one line per event,
//! either as the classic story text or as JSON lines.

use std::io::{self, Write};

use colored::Colorize;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use super::types::{EventLogEntry, WorkshopEvent};
use crate::config::NarrationFormat;

/// Console renderer for workshop events
#[derive(Debug, Clone)]
pub struct Narrator {
    format: NarrationFormat,
    color: bool,
}

impl Narrator {
    pub fn new(format: NarrationFormat, color: bool) -> Self {
        Self { format, color }
    }

    /// Story text for an event, without styling
    pub fn story(event: &WorkshopEvent) -> String {
        match event {
            WorkshopEvent::SantaSleeping => "Santa: zzZZzZzzzZZzzz (sleeping)".to_string(),
            WorkshopEvent::SantaAwake => "Santa: I'm up, I'm up! Whaddya want?".to_string(),
            WorkshopEvent::SantaNoticedElves { waiting } => {
                format!("Santa: There are {} elves outside my door!", waiting)
            }
            WorkshopEvent::SantaHelpingElf { elf } => format!("Santa: helping elf: {}.", elf),
            WorkshopEvent::ElvesDispatched { elves } => {
                let ids: Vec<String> = elves.iter().map(|e| e.to_string()).collect();
                format!("Santa: done with elves {}.", ids.join(", "))
            }
            WorkshopEvent::SleighPrepared { .. } => "Santa: preparing the sleigh.".to_string(),
            WorkshopEvent::ElfWorking { elf } => format!("Elf {} is working...", elf),
            WorkshopEvent::ElfNeedsHelp { elf } => format!("Elf {} needs Santa's help.", elf),
            WorkshopEvent::ElfInLine { elf, .. } => format!("Elf {} in line for santa's help.", elf),
            WorkshopEvent::ElvesWokeSanta { .. } => "Elves: waking up santa!".to_string(),
            WorkshopEvent::ElfHelped { elf } => format!("Elf {} got santa's help!", elf),
            WorkshopEvent::GroupServed { elf, .. } => {
                format!("Elf {}: that's the whole group, back to work everyone!", elf)
            }
            WorkshopEvent::ReindeerVacationing { reindeer } => {
                format!("Reindeer {} is off to the Tropics!", reindeer)
            }
            WorkshopEvent::ReindeerReturned { reindeer, .. } => {
                format!("Reindeer {} is back from the Tropics.", reindeer)
            }
            WorkshopEvent::ReindeerWokeSanta { reindeer } => {
                format!("Reindeer {}: I'm the last one; I'll get santa!", reindeer)
            }
            WorkshopEvent::ReindeerHitched { reindeer, .. } => {
                format!("Reindeer {} is getting hitched to the sleigh!", reindeer)
            }
            WorkshopEvent::SleighDeparted => "Santa: Ho ho ho! Off to deliver presents!".to_string(),
            WorkshopEvent::WorkshopClosed => "... And that year was a Merry Christmas indeed!".to_string(),
        }
    }

    /// Render an event as a single output line
    pub fn render(&self, event: &WorkshopEvent) -> String {
        match self.format {
            NarrationFormat::Json => serde_json::to_string(&EventLogEntry::new(event.clone()))
                .unwrap_or_else(|e| json_error_line(&e)),
            NarrationFormat::Text => {
                let line = Self::story(event);
                if !self.color {
                    return line;
                }
                match event {
                    WorkshopEvent::WorkshopClosed | WorkshopEvent::SleighDeparted => line.bold().red().to_string(),
                    WorkshopEvent::SantaSleeping
                    | WorkshopEvent::SantaAwake
                    | WorkshopEvent::SantaNoticedElves { .. }
                    | WorkshopEvent::SantaHelpingElf { .. }
                    | WorkshopEvent::ElvesDispatched { .. }
                    | WorkshopEvent::SleighPrepared { .. } => line.red().to_string(),
                    WorkshopEvent::ReindeerVacationing { .. }
                    | WorkshopEvent::ReindeerReturned { .. }
                    | WorkshopEvent::ReindeerWokeSanta { .. }
                    | WorkshopEvent::ReindeerHitched { .. } => line.yellow().to_string(),
                    _ => line.green().to_string(),
                }
            }
        }
    }

    /// Print events until every sender is gone
    ///
    /// Meant to be spawned as a background task before actors start.
    pub async fn run(self, mut rx: broadcast::Receiver<WorkshopEvent>) {
        debug!(format = %self.format, "Narrator::run: starting");
        let stdout = io::stdout();

        loop {
            match rx.recv().await {
                Ok(event) => {
                    let mut out = stdout.lock();
                    if let Err(e) = writeln!(out, "{}", self.render(&event)) {
                        error!(error = %e, "Narrator: failed to write to stdout");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "Narrator: lagged behind, missed events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Narrator: channel closed, shutting down");
                    break;
                }
            }
        }

        let _ = stdout.lock().flush();
    }
}

/// JSON line standing in for an event that failed to serialize
fn json_error_line(e: &dyn std::fmt::Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}
