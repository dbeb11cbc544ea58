//! Line commands understood by the terminal shell.

use std::str::FromStr;

use db::models::Role;
use services::router::Page;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SignUp {
        email: String,
        password: String,
        role: Option<Role>,
    },
    SignIn {
        email: String,
        password: String,
    },
    SignOut,
    Open(Page),
    CreateSession(String),
    /// Raw text read from a QR code.
    Scan(String),
    Anomalies(Option<String>),
    Records(String),
    Probe,
    Health,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  signup <email> <password> [teacher|student]
  signin <email> <password>
  signout
  open <page>              index.html, qr.html, teacher.html
  session <lecture name>   start an attendance session (teacher)
  scan <qr text>           check in with a scanned payload (student)
  anomalies [session id]   run anomaly detection (teacher)
  records <session id>     list check-ins of a session
  probe                    write a diagnostic record
  health                   query the anomaly service
  status                   show who is signed in
  help
  quit
passwords may contain spaces; a last word of teacher or student is the role";

/// Splits off the first word; the remainder keeps its inner spaces.
fn split_first_word(text: &str) -> (&str, &str) {
    text.split_once(char::is_whitespace)
        .map(|(first, tail)| (first, tail.trim()))
        .unwrap_or((text, ""))
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map(|(v, r)| (v, r.trim()))
            .unwrap_or((line, ""));

        let command = match verb.to_ascii_lowercase().as_str() {
            "signup" => {
                let (email, tail) = split_first_word(rest);
                // A trailing role name is the role; everything before it is the password.
                let (password, role) = match tail.rsplit_once(char::is_whitespace) {
                    Some((head, last)) => match last.parse::<Role>() {
                        Ok(role) => (head.trim_end(), Some(role)),
                        Err(_) => (tail, None),
                    },
                    None => (tail, None),
                };
                Command::SignUp {
                    email: email.to_owned(),
                    password: password.to_owned(),
                    role,
                }
            }
            "signin" => {
                let (email, password) = split_first_word(rest);
                Command::SignIn {
                    email: email.to_owned(),
                    password: password.to_owned(),
                }
            }
            "signout" => Command::SignOut,
            "open" | "goto" => Command::Open(Page::from_location(rest)),
            "session" => Command::CreateSession(rest.to_owned()),
            "scan" => Command::Scan(rest.to_owned()),
            "anomalies" => Command::Anomalies((!rest.is_empty()).then(|| rest.to_owned())),
            "records" if !rest.is_empty() => Command::Records(rest.to_owned()),
            "records" => return Err("usage: records <session id>".into()),
            "probe" => Command::Probe,
            "health" => Command::Health,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "" => return Err(String::new()),
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(command)
    }
}
