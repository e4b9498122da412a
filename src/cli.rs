//! Terminal front-end: stdin line commands driving one wizard session.

use std::sync::Arc;

use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::error::{Error, HandoffError};
use crate::handoff::{CopyMethod, NavigationMode};
use crate::wizard::{PREFERENCE_OPTIONS, Rating, WizardEvent, WizardSession, WizardState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Rate(Rating),
    Toggle(String),
    Text(String),
    Copy,
    Retry,
    Reset,
    Show,
    Help,
    Quit,
}

/// Parse one input line.
///
/// ```text
/// rate excellent | rate 🤩 | 1..4     pick a rating
/// tag 2 | tag lead quality            toggle a preference
/// text <anything>                     set the free text (empty clears it)
/// copy | retry | reset | show | help | quit
/// ```
pub fn parse_command(line: &str) -> Result<CliCommand, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_lowercase().as_str() {
        "rate" | "r" => parse_rating(rest).map(CliCommand::Rate),
        "tag" | "t" => parse_tag(rest).map(CliCommand::Toggle),
        "text" => Ok(CliCommand::Text(rest.to_string())),
        "copy" | "done" => Ok(CliCommand::Copy),
        "retry" => Ok(CliCommand::Retry),
        "reset" => Ok(CliCommand::Reset),
        "show" => Ok(CliCommand::Show),
        "help" | "?" => Ok(CliCommand::Help),
        "quit" | "exit" | "/quit" => Ok(CliCommand::Quit),
        _ if rest.is_empty() => parse_rating(head).map(CliCommand::Rate),
        other => Err(format!("unknown command: {other} (try 'help')")),
    }
}

fn parse_rating(input: &str) -> Result<Rating, String> {
    match input.parse::<usize>() {
        Ok(n) if (1..=Rating::ALL.len()).contains(&n) => Ok(Rating::ALL[n - 1]),
        Ok(n) => Err(format!("rating number must be 1-{}, got {n}", Rating::ALL.len())),
        Err(_) => input.parse(),
    }
}

fn parse_tag(input: &str) -> Result<String, String> {
    if let Ok(n) = input.parse::<usize>() {
        return PREFERENCE_OPTIONS
            .get(n.wrapping_sub(1))
            .map(|t| t.to_string())
            .ok_or_else(|| format!("tag number must be 1-{}", PREFERENCE_OPTIONS.len()));
    }
    PREFERENCE_OPTIONS
        .iter()
        .find(|t| t.eq_ignore_ascii_case(input))
        .map(|t| t.to_string())
        .ok_or_else(|| format!("unknown tag: {input}"))
}

/// One-line rendering of an event, or `None` for events with nothing to show.
pub fn render_event(event: &WizardEvent) -> Option<String> {
    let line = match event {
        WizardEvent::StateChanged { state } => match state {
            WizardState::SelectingRating => rating_menu(),
            WizardState::CollectingPreferences => preference_menu(),
            WizardState::Negative => {
                "Thanks for the honest feedback. We'll use it to do better.".to_string()
            }
            WizardState::Redirecting => "Taking you to the review page...".to_string(),
        },
        WizardEvent::Celebrate => "🎉 Glad to hear it!".to_string(),
        WizardEvent::ReviewCleared => return None,
        WizardEvent::SynthesisStarted { .. } => "⏳ Writing your review...".to_string(),
        WizardEvent::ReviewReady { text, .. } => {
            format!("\n  \"{text}\"\n\nType 'copy' to copy it and continue, or keep editing.")
        }
        WizardEvent::SynthesisFailed { reason, .. } => {
            format!("❌ Couldn't write a review ({reason}). Type 'retry' to try again.")
        }
        WizardEvent::Copied { method } => match method {
            CopyMethod::Primary => "✅ Copied to clipboard".to_string(),
            CopyMethod::Fallback => "✅ Copied via terminal clipboard".to_string(),
        },
        WizardEvent::ManualCopyRequired { text } => {
            format!("⚠️  Couldn't reach a clipboard. Please copy this yourself:\n\n{text}\n")
        }
        WizardEvent::Progress { percent } => format!("   {percent:>3}%"),
        WizardEvent::Navigated { url, mode } => match mode {
            NavigationMode::NewContext => format!("🔗 Opened {url} in a new window"),
            NavigationMode::SameContext => format!("🔗 Opened {url}"),
        },
        WizardEvent::NavigationFailed { url, reason } => {
            format!("⚠️  Couldn't open the review page ({reason}). Please visit:\n\n{url}\n")
        }
    };
    Some(line)
}

fn rating_menu() -> String {
    let options: Vec<String> = Rating::ALL
        .iter()
        .enumerate()
        .map(|(i, r)| format!("  {}. {} {}", i + 1, r.symbol(), r.label()))
        .collect();
    format!("How was your experience?\n{}", options.join("\n"))
}

fn preference_menu() -> String {
    let options: Vec<String> = PREFERENCE_OPTIONS
        .iter()
        .enumerate()
        .map(|(i, t)| format!("  {}. {t}", i + 1))
        .collect();
    format!(
        "What did you like? Toggle with 'tag <n>', add details with 'text ...'.\n{}",
        options.join("\n")
    )
}

const HELP: &str = "\
Commands:
  1-4 | rate <name>     pick a rating
  tag <n|name>         toggle a preference
  text <words>         describe it in your own words
  copy                 copy the review and open the review page
  retry                regenerate the review
  reset                start over
  show                 print the current wizard state
  quit                 exit";

/// Drive `session` from stdin until the handoff completes, the wizard ends
/// on a non-positive rating, or input runs out.
pub async fn run(session: Arc<WizardSession>) -> Result<(), Error> {
    let mut events = BroadcastStream::new(session.subscribe());
    let renderer = tokio::spawn(async move {
        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    if let Some(line) = render_event(&event) {
                        eprintln!("{line}");
                    }
                }
                Err(e) => warn!(error = %e, "Renderer fell behind"),
            }
        }
    });

    eprintln!("{}", rating_menu());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let result = loop {
        eprint!("> ");
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break Ok(()),
            Err(e) => {
                tracing::error!("Error reading stdin: {}", e);
                break Ok(());
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(c) => c,
            Err(msg) => {
                eprintln!("{msg}");
                continue;
            }
        };
        debug!(?command, "CLI command");

        match dispatch(&session, command).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Finished) => break Ok(()),
            Err(Error::Handoff(HandoffError::ManualCopyRequired { .. })) => {}
            Err(Error::Handoff(HandoffError::NavigationFailed { .. })) => break Ok(()),
            Err(Error::Wizard(e)) => eprintln!("{e}"),
            Err(e) => break Err(e),
        }
    };

    // Let the last events reach the terminal
    tokio::task::yield_now().await;
    renderer.abort();
    result
}

enum Flow {
    Continue,
    Finished,
}

async fn dispatch(session: &WizardSession, command: CliCommand) -> Result<Flow, Error> {
    match command {
        CliCommand::Rate(rating) => {
            if session.select_rating(rating).await?.is_terminal() {
                return Ok(Flow::Finished);
            }
        }
        CliCommand::Toggle(tag) => {
            session.toggle_preference(&tag).await?;
        }
        CliCommand::Text(text) => {
            session.set_free_text(&text).await?;
        }
        CliCommand::Copy => {
            session.settle().await;
            session.commit().await?;
            return Ok(Flow::Finished);
        }
        CliCommand::Retry => {
            session.retry().await?;
        }
        CliCommand::Reset => session.reset().await,
        CliCommand::Show => {
            let snapshot = session.snapshot().await;
            match serde_json::to_string_pretty(&snapshot) {
                Ok(json) => eprintln!("{json}"),
                Err(e) => warn!(error = %e, "Failed to render snapshot"),
            }
        }
        CliCommand::Help => eprintln!("{HELP}"),
        CliCommand::Quit => return Ok(Flow::Finished),
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::GenerationToken;

    #[test]
    fn parses_ratings() {
        assert_eq!(parse_command("1").unwrap(), CliCommand::Rate(Rating::Excellent));
        assert_eq!(parse_command("rate okay").unwrap(), CliCommand::Rate(Rating::Ok));
        assert_eq!(parse_command("🤩").unwrap(), CliCommand::Rate(Rating::Excellent));
        assert_eq!(parse_command("r 4").unwrap(), CliCommand::Rate(Rating::Bad));
        assert!(parse_command("rate 9").is_err());
    }

    #[test]
    fn parses_tags_by_number_and_name() {
        assert_eq!(
            parse_command("tag 1").unwrap(),
            CliCommand::Toggle("Customer Support".into())
        );
        assert_eq!(
            parse_command("t lead quality").unwrap(),
            CliCommand::Toggle("Lead Quality".into())
        );
        assert!(parse_command("tag 0").is_err());
        assert!(parse_command("tag 7").is_err());
        assert!(parse_command("tag pricing").is_err());
    }

    #[test]
    fn parses_text_and_keywords() {
        assert_eq!(
            parse_command("text  setup took ten minutes ").unwrap(),
            CliCommand::Text("setup took ten minutes".into())
        );
        assert_eq!(parse_command("text").unwrap(), CliCommand::Text(String::new()));
        assert_eq!(parse_command("COPY").unwrap(), CliCommand::Copy);
        assert_eq!(parse_command("/quit").unwrap(), CliCommand::Quit);
        assert!(parse_command("dance now").is_err());
    }

    #[test]
    fn renders_events() {
        assert!(render_event(&WizardEvent::ReviewCleared).is_none());
        assert_eq!(
            render_event(&WizardEvent::Progress { percent: 40 }).as_deref(),
            Some("    40%")
        );
        let ready = render_event(&WizardEvent::ReviewReady {
            token: GenerationToken(1),
            text: "Great leads.".into(),
        })
        .unwrap();
        assert!(ready.contains("\"Great leads.\""));

        let failed = render_event(&WizardEvent::NavigationFailed {
            url: "https://example.test/review".into(),
            reason: "no browser".into(),
        })
        .unwrap();
        assert!(failed.contains("https://example.test/review"));

        let menu = render_event(&WizardEvent::StateChanged {
            state: WizardState::CollectingPreferences,
        })
        .unwrap();
        for tag in PREFERENCE_OPTIONS {
            assert!(menu.contains(tag));
        }
    }
}
