//! Interactive command-line front end.

use std::sync::Arc;

use leasewire_shared::ServerEvent;
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::{broadcast, mpsc};

use crate::{
    client::ConnectionClient, config::ClientConfig, registry::ClientRegistry,
    transport::WebSocketConnector,
};

const HELP: &str = "commands: /join <id>, /leave <id>, /typing <id> on|off, /read <id> <msgId>..., /status, /quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Join(String),
    Leave(String),
    Typing { conversation_id: String, on: bool },
    Read {
        conversation_id: String,
        message_ids: Vec<String>,
    },
    Status,
    Quit,
}

pub fn parse_command(line: &str) -> Result<CliCommand, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Err(HELP.to_string());
    };
    let args: Vec<String> = words.map(str::to_string).collect();

    match (command, args.as_slice()) {
        ("/join", [id]) => Ok(CliCommand::Join(id.clone())),
        ("/leave", [id]) => Ok(CliCommand::Leave(id.clone())),
        ("/typing", [id, flag]) => match flag.as_str() {
            "on" => Ok(CliCommand::Typing {
                conversation_id: id.clone(),
                on: true,
            }),
            "off" => Ok(CliCommand::Typing {
                conversation_id: id.clone(),
                on: false,
            }),
            _ => Err("usage: /typing <id> on|off".to_string()),
        },
        ("/read", [id, message_ids @ ..]) if !message_ids.is_empty() => Ok(CliCommand::Read {
            conversation_id: id.clone(),
            message_ids: message_ids.to_vec(),
        }),
        ("/status", []) => Ok(CliCommand::Status),
        ("/quit", []) => Ok(CliCommand::Quit),
        _ => Err(HELP.to_string()),
    }
}

/// Whether the prompt should stop reading after forwarding `line`
fn ends_input(line: &str) -> bool {
    matches!(parse_command(line), Ok(CliCommand::Quit))
}

fn apply(client: &ConnectionClient, command: CliCommand) {
    match command {
        CliCommand::Join(id) => client.join_conversation(id),
        CliCommand::Leave(id) => client.leave_conversation(id),
        CliCommand::Typing {
            conversation_id,
            on: true,
        } => client.send_typing_start(conversation_id),
        CliCommand::Typing {
            conversation_id,
            on: false,
        } => client.send_typing_stop(conversation_id),
        CliCommand::Read {
            conversation_id,
            message_ids,
        } => client.send_message_read(conversation_id, message_ids),
        CliCommand::Status => println!("status: {}", client.state()),
        CliCommand::Quit => {}
    }
}

pub fn describe(event: &ServerEvent) -> String {
    match event {
        ServerEvent::MessageNew(p) => {
            format!("[{}] {}: {}", p.conversation_id, p.sender_name, p.content)
        }
        ServerEvent::MessageRead(p) => format!(
            "[{}] {} read {}",
            p.conversation_id,
            p.reader_id,
            p.message_ids.join(", ")
        ),
        ServerEvent::MessageDeleted(p) => {
            format!("[{}] message {} deleted", p.conversation_id, p.message_id)
        }
        ServerEvent::TypingStart(p) => format!("[{}] {} is typing...", p.conversation_id, p.user_name),
        ServerEvent::TypingStop(p) => {
            format!("[{}] {} stopped typing", p.conversation_id, p.user_name)
        }
        ServerEvent::ConversationCreated(p) => format!(
            "new conversation {} ({} participants)",
            p.id,
            p.participants.len()
        ),
        ServerEvent::ConversationUpdated(p) => format!(
            "conversation {} updated at {}",
            p.conversation_id,
            leasewire_shared::time::to_rfc3339(&p.last_message_at)
        ),
        ServerEvent::Notification(p) => format!("notification: {} - {}", p.title, p.body),
    }
}

/// Connect, print incoming events and read commands until `/quit` or EOF.
pub async fn run_client(config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let connector = Arc::new(WebSocketConnector::new(&config.server_url)?);
    let registry = ClientRegistry::new();
    let client = registry.initialize(connector, config.handshake(), config.client_options());

    let mut events = client.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => println!("{}", describe(&event)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut states = client.watch_state();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            println!("* {state}");
        }
    });

    // rustyline blocks, so it gets its own thread
    let (lines_tx, mut lines_rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                tracing::error!("Failed to start line editor: {}", e);
                return;
            }
        };
        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    // Returning to readline after /quit would keep the runtime alive
                    let last = ends_input(&line);
                    if lines_tx.send(line).is_err() || last {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    tracing::error!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });

    println!("{HELP}");
    while let Some(line) = lines_rx.recv().await {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(CliCommand::Quit) => break,
            Ok(command) => apply(&client, command),
            Err(usage) => println!("{usage}"),
        }
    }

    registry.disconnect().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        // テスト項目: 各コマンドを解釈できる
        assert_eq!(parse_command("/join 42"), Ok(CliCommand::Join("42".to_string())));
        assert_eq!(parse_command("/leave 42"), Ok(CliCommand::Leave("42".to_string())));
        assert_eq!(
            parse_command("/typing 42 off"),
            Ok(CliCommand::Typing {
                conversation_id: "42".to_string(),
                on: false
            })
        );
        assert_eq!(
            parse_command("/read 42 m-1 m-2"),
            Ok(CliCommand::Read {
                conversation_id: "42".to_string(),
                message_ids: vec!["m-1".to_string(), "m-2".to_string()],
            })
        );
        assert_eq!(parse_command("  /status "), Ok(CliCommand::Status));
        assert_eq!(parse_command("/quit"), Ok(CliCommand::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        // テスト項目: 引数不足・未知のコマンドは使い方を返す
        assert!(parse_command("/read 42").is_err());
        assert!(parse_command("/typing 42 maybe").is_err());
        assert!(parse_command("/join").is_err());
        assert!(parse_command("hello").is_err());
    }

    #[test]
    fn test_prompt_stops_after_quit() {
        // テスト項目: /quit を転送したら入力ループは終了し、それ以外の行では続ける
        assert!(ends_input("/quit"));
        assert!(ends_input("  /quit  "));
        assert!(!ends_input("/join 42"));
        assert!(!ends_input("/quit now"));
        assert!(!ends_input(""));
    }
}
