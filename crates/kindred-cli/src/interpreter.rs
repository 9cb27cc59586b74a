//! Line-oriented command language over a family tree

use thiserror::Error;

use kindred_core::{
    FamilyTree, Gender, LineageDirection, Person, PersonId, PersonView, RelativesQuery,
};

use crate::output::{Outcome, TreeLine};

/// Failure of a single command line
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    Parse(String),

    #[error(transparent)]
    Tree(#[from] kindred_core::Error),
}

impl CommandError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::Tree(e) => e.kind(),
        }
    }
}

type CommandResult<T> = std::result::Result<T, CommandError>;

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddPerson {
        name: String,
        gender: Gender,
        birth_year: i32,
        death_year: Option<i32>,
    },
    AddParentChild { parent: String, child: String },
    Marry { a: String, b: String, year: i32 },
    Ancestors { id: String, generations: i32 },
    Descendants { id: String, generations: i32 },
    AncestorsAt { id: String, generation: i32 },
    DescendantsAt { id: String, generation: i32 },
    Siblings { id: String },
    Children { id: String },
    Spouse { id: String },
    Show { id: String },
    SetName { id: String, name: String },
    SetGender { id: String, gender: Gender },
    SetBirth { id: String, year: i32 },
    SetDeath { id: String, year: Option<i32> },
    Help,
    Exit,
}

pub const HELP: &[&str] = &[
    "ADD_PERSON \"<name>\" <MALE|FEMALE|OTHER> <birth> [<death>]",
    "ADD_PARENT_CHILD <parent> <child>",
    "MARRY <a> <b> <year>",
    "ANCESTORS <id> <generations>",
    "DESCENDANTS <id> <generations>",
    "ANCESTORS_AT <id> <generation>",
    "DESCENDANTS_AT <id> <generation>",
    "SIBLINGS <id>",
    "CHILDREN <id>",
    "SPOUSE <id>",
    "SHOW <id>",
    "SET_NAME <id> \"<name>\"",
    "SET_GENDER <id> <MALE|FEMALE|OTHER>",
    "SET_BIRTH <id> <year>",
    "SET_DEATH <id> <year|NONE>",
    "HELP",
    "EXIT",
];

/// Split a line on whitespace, keeping double-quoted sections together
pub fn tokenize(line: &str) -> CommandResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '"' {
            chars.next();
            let mut token = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some(ch) => token.push(ch),
                    None => return Err(CommandError::Parse("Unterminated quote".to_string())),
                }
            }
            tokens.push(token);
        } else {
            let mut token = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                token.push(ch);
                chars.next();
            }
            tokens.push(token);
        }
    }

    Ok(tokens)
}

/// Cursor over the arguments of one command
struct Args<'a> {
    command: &'a str,
    tokens: std::slice::Iter<'a, String>,
}

impl<'a> Args<'a> {
    fn next(&mut self, what: &str) -> CommandResult<&'a str> {
        self.tokens.next().map(String::as_str).ok_or_else(|| {
            CommandError::Parse(format!("{}: missing {}", self.command, what))
        })
    }

    fn id(&mut self) -> CommandResult<String> {
        self.next("person ID").map(str::to_string)
    }

    fn number(&mut self, what: &str) -> CommandResult<i32> {
        let raw = self.next(what)?;
        parse_number(self.command, what, raw)
    }

    fn gender(&mut self) -> CommandResult<Gender> {
        Ok(self.next("gender")?.parse()?)
    }

    fn optional(&mut self) -> Option<&'a str> {
        self.tokens.next().map(String::as_str)
    }

    fn finish(mut self) -> CommandResult<()> {
        match self.tokens.next() {
            Some(extra) => Err(CommandError::Parse(format!(
                "{}: unexpected argument '{}'",
                self.command, extra
            ))),
            None => Ok(()),
        }
    }
}

fn parse_number(command: &str, what: &str, raw: &str) -> CommandResult<i32> {
    raw.parse().map_err(|_| {
        CommandError::Parse(format!("{}: {} must be a number, got '{}'", command, what, raw))
    })
}

/// Parse one line. Blank lines and `#` comments yield `None`.
pub fn parse(line: &str) -> CommandResult<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let tokens = tokenize(line)?;
    let Some((head, rest)) = tokens.split_first() else {
        return Ok(None);
    };
    let name = head.to_uppercase();
    let mut args = Args {
        command: &name,
        tokens: rest.iter(),
    };

    let command = match name.as_str() {
        "ADD_PERSON" => {
            let name = args.next("name")?.to_string();
            let gender = args.gender()?;
            let birth_year = args.number("birth year")?;
            let death_year = args
                .optional()
                .map(|raw| parse_number("ADD_PERSON", "death year", raw))
                .transpose()?;
            Command::AddPerson {
                name,
                gender,
                birth_year,
                death_year,
            }
        }
        "ADD_PARENT_CHILD" => Command::AddParentChild {
            parent: args.id()?,
            child: args.id()?,
        },
        "MARRY" => Command::Marry {
            a: args.id()?,
            b: args.id()?,
            year: args.number("year")?,
        },
        "ANCESTORS" => Command::Ancestors {
            id: args.id()?,
            generations: args.number("generations")?,
        },
        "DESCENDANTS" => Command::Descendants {
            id: args.id()?,
            generations: args.number("generations")?,
        },
        "ANCESTORS_AT" => Command::AncestorsAt {
            id: args.id()?,
            generation: args.number("generation")?,
        },
        "DESCENDANTS_AT" => Command::DescendantsAt {
            id: args.id()?,
            generation: args.number("generation")?,
        },
        "SIBLINGS" => Command::Siblings { id: args.id()? },
        "CHILDREN" => Command::Children { id: args.id()? },
        "SPOUSE" => Command::Spouse { id: args.id()? },
        "SHOW" => Command::Show { id: args.id()? },
        "SET_NAME" => Command::SetName {
            id: args.id()?,
            name: args.next("name")?.to_string(),
        },
        "SET_GENDER" => Command::SetGender {
            id: args.id()?,
            gender: args.gender()?,
        },
        "SET_BIRTH" => Command::SetBirth {
            id: args.id()?,
            year: args.number("birth year")?,
        },
        "SET_DEATH" => {
            let id = args.id()?;
            let raw = args.next("death year")?;
            let year = if raw.eq_ignore_ascii_case("NONE") {
                None
            } else {
                Some(parse_number("SET_DEATH", "death year", raw)?)
            };
            Command::SetDeath { id, year }
        }
        "HELP" => Command::Help,
        "EXIT" | "QUIT" => Command::Exit,
        _ => return Err(CommandError::Parse(format!("Unknown command: {}", head))),
    };

    args.finish()?;
    Ok(Some(command))
}

fn views(persons: Vec<&Person>) -> Vec<PersonView> {
    persons.into_iter().map(Person::view).collect()
}

fn lineage(
    tree: &FamilyTree,
    id: &str,
    generations: i32,
    direction: LineageDirection,
) -> CommandResult<Outcome> {
    let lines = tree
        .lineage(id, generations, direction)?
        .into_iter()
        .map(|node| -> CommandResult<TreeLine> {
            Ok(TreeLine {
                depth: node.depth,
                person: tree.show(node.id.as_str())?,
            })
        })
        .collect::<CommandResult<Vec<_>>>()?;
    Ok(Outcome::Tree(lines))
}

/// Run one command against the tree
pub fn execute(tree: &mut FamilyTree, command: Command) -> CommandResult<Outcome> {
    tracing::debug!("Executing {:?}", command);

    let outcome = match command {
        Command::AddPerson {
            name,
            gender,
            birth_year,
            death_year,
        } => {
            let id: PersonId = tree.add_person(&name, gender, birth_year, death_year)?;
            tracing::info!("Added person {} ({})", id, name);
            Outcome::Created(id)
        }
        Command::AddParentChild { parent, child } => {
            tree.add_parent_child(&parent, &child)?;
            Outcome::Done
        }
        Command::Marry { a, b, year } => {
            tree.marry(&a, &b, year)?;
            Outcome::Done
        }
        Command::Ancestors { id, generations } => {
            lineage(tree, &id, generations, LineageDirection::Ancestors)?
        }
        Command::Descendants { id, generations } => {
            lineage(tree, &id, generations, LineageDirection::Descendants)?
        }
        Command::AncestorsAt { id, generation } => {
            Outcome::People(views(tree.ancestors_at_generation(&id, generation)?))
        }
        Command::DescendantsAt { id, generation } => {
            Outcome::People(views(tree.descendants_at_generation(&id, generation)?))
        }
        Command::Siblings { id } => Outcome::People(views(tree.siblings(&id)?)),
        Command::Children { id } => Outcome::People(views(tree.children(&id)?)),
        Command::Spouse { id } => Outcome::Spouse(tree.spouse(&id)?.map(Person::view)),
        Command::Show { id } => Outcome::Person(tree.show(&id)?),
        Command::SetName { id, name } => {
            tree.set_full_name(&id, &name)?;
            Outcome::Done
        }
        Command::SetGender { id, gender } => {
            tree.set_gender(&id, gender)?;
            Outcome::Done
        }
        Command::SetBirth { id, year } => {
            tree.set_birth_year(&id, year)?;
            Outcome::Done
        }
        Command::SetDeath { id, year } => {
            tree.set_death_year(&id, year)?;
            Outcome::Done
        }
        Command::Help => Outcome::Help(HELP.iter().map(|s| s.to_string()).collect()),
        Command::Exit => Outcome::Exit,
    };

    Ok(outcome)
}
