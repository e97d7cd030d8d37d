//! Parsing of interactive console lines into page commands.

use page_controller::{Field, FormKind, PageCommand};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  list                                   reload the employee list
  show <add|update|review|deactivate>    show one form
  hide                                   back to the default view
  set <form> <field>=<value>...          fill form inputs
  clear <form>                           blank a form
  submit <form>                          submit a form
  add name=.. position=.. department=.. contact=..
  update id=.. name=.. position=.. department=.. contact=..
  review id=.. review=\"...\"
  deactivate id=..
  details <id>                           show one employee
  delete <id>                            delete one employee
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Commands(Vec<PageCommand>),
    Help,
    Quit,
    Nothing,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
    #[error("'{0}' expects {1}")]
    MissingArgument(&'static str, &'static str),
    #[error("expected <field>=<value>, got '{0}'")]
    MalformedAssignment(String),
    #[error("unterminated quote")]
    UnterminatedQuote,
    #[error("{0}")]
    Controller(String),
}

pub fn parse_line(line: &str) -> Result<ConsoleInput, InputError> {
    let tokens = tokenize(line)?;
    let Some((head, rest)) = tokens.split_first() else {
        return Ok(ConsoleInput::Nothing);
    };

    let commands = match head.to_ascii_lowercase().as_str() {
        "help" | "?" => return Ok(ConsoleInput::Help),
        "quit" | "exit" => return Ok(ConsoleInput::Quit),
        "list" | "reload" => vec![PageCommand::Reload],
        "hide" => vec![PageCommand::ShowDefault],
        "show" => vec![PageCommand::Toggle(form_arg("show", rest)?)],
        "clear" => vec![PageCommand::Clear(form_arg("clear", rest)?)],
        "submit" => vec![PageCommand::Submit(form_arg("submit", rest)?)],
        "set" => {
            let form = form_arg("set", rest)?;
            assignments(form, &rest[1..])?
        }
        "details" => vec![PageCommand::OpenDetails {
            id: id_arg("details", rest)?,
        }],
        "delete" => vec![PageCommand::Delete {
            id: id_arg("delete", rest)?,
        }],
        other => match other.parse::<FormKind>() {
            Ok(form) => {
                let mut commands = assignments(form, rest)?;
                commands.push(PageCommand::Submit(form));
                commands
            }
            Err(_) => return Err(InputError::UnknownCommand(head.clone())),
        },
    };

    Ok(ConsoleInput::Commands(commands))
}

fn form_arg(command: &'static str, rest: &[String]) -> Result<FormKind, InputError> {
    let raw = rest
        .first()
        .ok_or(InputError::MissingArgument(command, "a form name"))?;
    raw.parse()
        .map_err(|err: page_controller::ControllerError| InputError::Controller(err.to_string()))
}

fn id_arg(command: &'static str, rest: &[String]) -> Result<String, InputError> {
    rest.first()
        .cloned()
        .ok_or(InputError::MissingArgument(command, "an employee id"))
}

fn assignments(form: FormKind, tokens: &[String]) -> Result<Vec<PageCommand>, InputError> {
    tokens
        .iter()
        .map(|token| {
            let (field, value) = token
                .split_once('=')
                .ok_or_else(|| InputError::MalformedAssignment(token.clone()))?;
            let field: Field = field
                .parse()
                .map_err(|err: page_controller::ControllerError| {
                    InputError::Controller(err.to_string())
                })?;
            Ok(PageCommand::SetInput {
                form,
                field,
                value: value.to_string(),
            })
        })
        .collect()
}

/// Splits on whitespace; double quotes group words and may open mid-token.
fn tokenize(line: &str) -> Result<Vec<String>, InputError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quoted {
        return Err(InputError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
