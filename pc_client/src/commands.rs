use product_catalog::{NewProduct, ProductId, ProductUpdate};
use std::fmt;

/// A single invocation of the command-line client.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login {
        username: String,
        password: String,
    },
    Register {
        username: String,
        email: String,
        password: String,
        confirm_password: String,
    },
    Logout,
    WhoAmI,
    ForgotPassword {
        email: String,
    },
    /// Page and page size fall back to the configured defaults when absent
    List {
        page: Option<u32>,
        per_page: Option<u32>,
    },
    Get {
        id: ProductId,
    },
    Create(NewProduct),
    Update {
        id: ProductId,
        update: ProductUpdate,
    },
    Delete {
        id: ProductId,
    },
    Search {
        query: String,
    },
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No command word was given.
    MissingCommand,
    /// A required positional argument is absent.
    MissingArgument {
        command: String,
        argument: &'static str,
    },
    /// A numeric argument did not parse.
    InvalidNumber {
        argument: &'static str,
        value: String,
    },
    /// An update assignment was not of the form FIELD=VALUE.
    InvalidAssignment(String),
    /// An update named a field products do not have.
    UnknownField(String),
    /// More arguments than the command accepts.
    UnexpectedArgument(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCommand => write!(f, "No command given. Run with --help for usage"),
            Self::MissingArgument { command, argument } => {
                write!(f, "'{command}' requires {argument}")
            }
            Self::InvalidNumber { argument, value } => {
                write!(f, "Invalid {argument} '{value}'. Must be a number")
            }
            Self::InvalidAssignment(value) => write!(
                f,
                "Invalid update '{value}'. Use FIELD=VALUE (e.g., 'price=9.99')"
            ),
            Self::UnknownField(field) => write!(
                f,
                "Unknown field '{field}'. Use title, price, description or category"
            ),
            Self::UnexpectedArgument(value) => write!(f, "Unexpected argument '{value}'"),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{cmd}'. Run with --help to see available commands"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse the positional arguments left after option parsing.
///
/// # Examples
///
/// ```
/// use pc_client::commands::{Command, parse_command};
///
/// let args: Vec<String> = ["list", "2"].iter().map(|s| s.to_string()).collect();
/// assert_eq!(
///     parse_command(&args),
///     Ok(Command::List { page: Some(2), per_page: None })
/// );
/// ```
pub fn parse_command(args: &[String]) -> Result<Command, ParseError> {
    let Some((name, rest)) = args.split_first() else {
        return Err(ParseError::MissingCommand);
    };
    let mut rest = Args::new(name, rest);

    let command = match name.as_str() {
        "login" => Command::Login {
            username: rest.required("USERNAME")?,
            password: rest.required("PASSWORD")?,
        },
        "register" => Command::Register {
            username: rest.required("USERNAME")?,
            email: rest.required("EMAIL")?,
            password: rest.required("PASSWORD")?,
            confirm_password: rest.required("CONFIRM")?,
        },
        "logout" => Command::Logout,
        "whoami" => Command::WhoAmI,
        "forgot-password" => Command::ForgotPassword {
            email: rest.required("EMAIL")?,
        },
        "list" => Command::List {
            page: rest.optional_number("PAGE")?,
            per_page: rest.optional_number("PER_PAGE")?,
        },
        "get" => Command::Get {
            id: parse_id(&rest.required("ID")?),
        },
        "create" => {
            let mut product = NewProduct::new(rest.required("TITLE")?);
            if let Some(price) = rest.optional_number("PRICE")? {
                product = product.price(price);
            }
            if let Some(description) = rest.next() {
                product = product.description(description);
            }
            Command::Create(product)
        }
        "update" => {
            let id = parse_id(&rest.required("ID")?);
            let assignments = rest.remaining();
            if assignments.is_empty() {
                return Err(ParseError::MissingArgument {
                    command: "update".to_string(),
                    argument: "FIELD=VALUE",
                });
            }
            let mut update = ProductUpdate::default();
            for assignment in assignments {
                apply_assignment(&mut update, &assignment)?;
            }
            Command::Update { id, update }
        }
        "delete" => Command::Delete {
            id: parse_id(&rest.required("ID")?),
        },
        "search" => {
            let query = rest.remaining().join(" ");
            if query.trim().is_empty() {
                return Err(ParseError::MissingArgument {
                    command: "search".to_string(),
                    argument: "QUERY",
                });
            }
            Command::Search { query }
        }
        other => return Err(ParseError::UnrecognizedCommand(other.to_string())),
    };

    rest.finish()?;
    Ok(command)
}

/// Numeric ids are sent as numbers, anything else verbatim
pub fn parse_id(raw: &str) -> ProductId {
    match raw.trim().parse::<i64>() {
        Ok(id) => ProductId::Int(id),
        Err(_) => ProductId::Str(raw.trim().to_string()),
    }
}

fn apply_assignment(update: &mut ProductUpdate, assignment: &str) -> Result<(), ParseError> {
    let Some((field, value)) = assignment.split_once('=') else {
        return Err(ParseError::InvalidAssignment(assignment.to_string()));
    };

    match field.trim() {
        "title" => update.title = Some(value.to_string()),
        "description" => update.description = Some(value.to_string()),
        "category" => update.category = Some(value.to_string()),
        "price" => {
            let price = value.trim().parse().map_err(|_| ParseError::InvalidNumber {
                argument: "price",
                value: value.to_string(),
            })?;
            update.price = Some(price);
        }
        other => return Err(ParseError::UnknownField(other.to_string())),
    }
    Ok(())
}

/// Cursor over a command's positional arguments
struct Args<'a> {
    command: &'a str,
    iter: std::slice::Iter<'a, String>,
}

impl<'a> Args<'a> {
    fn new(command: &'a str, args: &'a [String]) -> Self {
        Self {
            command,
            iter: args.iter(),
        }
    }

    fn next(&mut self) -> Option<String> {
        self.iter.next().cloned()
    }

    fn required(&mut self, argument: &'static str) -> Result<String, ParseError> {
        self.next().ok_or_else(|| ParseError::MissingArgument {
            command: self.command.to_string(),
            argument,
        })
    }

    fn optional_number<T: std::str::FromStr>(
        &mut self,
        argument: &'static str,
    ) -> Result<Option<T>, ParseError> {
        self.next()
            .map(|value| {
                value.trim().parse().map_err(|_| ParseError::InvalidNumber {
                    argument,
                    value: value.clone(),
                })
            })
            .transpose()
    }

    fn remaining(&mut self) -> Vec<String> {
        self.iter.by_ref().cloned().collect()
    }

    fn finish(mut self) -> Result<(), ParseError> {
        match self.next() {
            Some(extra) => Err(ParseError::UnexpectedArgument(extra)),
            None => Ok(()),
        }
    }
}
