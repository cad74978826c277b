/*
 * A line-oriented text host for the explorer. It plays the role of the tree
 * view: it parses user input into `AppEvent`s, keeps the list of node
 * descriptors the logic last sent, and draws that list (with the substructure
 * rows of expanded nodes) to an output stream.
 *
 * The shell holds no explorer state of its own besides the descriptors it was
 * told to show. Toggling a node asks the logic to open it if the last received
 * descriptor says it is collapsed, and to close it otherwise.
 */
use super::error::{PlatformError, Result as PlatformResult};
use super::types::{AppEvent, EntityDescriptor, PlatformCommand};
use crate::app_logic::ui_constants::STRUCTURE_ROW_STEP;
use crate::core::models::{DatasourceKey, DatasourceTable};
use crate::core::{DatasourceId, QueryId, StructureCacheEntry};
use std::io::Write;

const INDENT: &str = "  ";

// What an input line asks the shell to do.
#[derive(Debug)]
pub enum ShellInput {
    Event(AppEvent),
    Show,
    Nothing,
}

pub struct ConsoleShell<W: Write> {
    out: W,
    entities: Vec<EntityDescriptor>,
}

impl<W: Write> ConsoleShell<W> {
    pub fn new(out: W) -> Self {
        ConsoleShell {
            out,
            entities: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn entity(&self, id: &str) -> PlatformResult<&EntityDescriptor> {
        self.entities
            .iter()
            .find(|e| e.datasource_id.as_str() == id)
            .ok_or_else(|| PlatformError::UnknownNode(id.to_string()))
    }

    pub fn parse_line(&self, line: &str) -> PlatformResult<ShellInput> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        fn required<'a>(
            rest: &'a str,
            command: &'static str,
            argument: &'static str,
        ) -> PlatformResult<&'a str> {
            if rest.is_empty() {
                Err(PlatformError::MissingArgument { command, argument })
            } else {
                Ok(rest)
            }
        }

        let input = match command {
            "" => ShellInput::Nothing,
            "goto" => ShellInput::Event(AppEvent::LocationChanged {
                path: required(rest, "goto", "path")?.to_string(),
            }),
            "toggle" => {
                let entity = self.entity(required(rest, "toggle", "id")?)?;
                ShellInput::Event(AppEvent::EntityToggled {
                    datasource_id: entity.datasource_id.clone(),
                    open: !entity.expanded,
                })
            }
            "expand" => {
                let id = required(rest, "expand", "id")?;
                ShellInput::Event(AppEvent::ForceExpandDatasource {
                    datasource_id: (id != "-").then(|| DatasourceId::from(id)),
                })
            }
            "click" => {
                let entity = self.entity(required(rest, "click", "id")?)?;
                ShellInput::Event(AppEvent::EntityClicked {
                    datasource_id: entity.datasource_id.clone(),
                })
            }
            "query" => ShellInput::Event(AppEvent::QueryOpened {
                query_id: QueryId::from(required(rest, "query", "id")?),
            }),
            "rename" => {
                let args = required(rest, "rename", "id")?;
                let (id, name) = args.split_once(char::is_whitespace).ok_or(
                    PlatformError::MissingArgument {
                        command: "rename",
                        argument: "name",
                    },
                )?;
                ShellInput::Event(AppEvent::RenameRequested {
                    datasource_id: DatasourceId::from(id),
                    new_name: name.trim().to_string(),
                })
            }
            "invalidate" => ShellInput::Event(AppEvent::DatasourceStructureChanged {
                datasource_id: DatasourceId::from(required(rest, "invalidate", "id")?),
            }),
            "search" => ShellInput::Event(AppEvent::SearchKeywordChanged {
                keyword: (!rest.is_empty()).then(|| rest.to_string()),
            }),
            "mount" => ShellInput::Event(AppEvent::EntityMounted {
                datasource_id: DatasourceId::from(required(rest, "mount", "id")?),
            }),
            "unmount" => ShellInput::Event(AppEvent::EntityUnmounted {
                datasource_id: DatasourceId::from(required(rest, "unmount", "id")?),
            }),
            "refresh" => ShellInput::Event(AppEvent::RefreshRequested),
            "show" => ShellInput::Show,
            "quit" | "exit" => ShellInput::Event(AppEvent::QuitRequested),
            other => return Err(PlatformError::UnknownCommand(other.to_string())),
        };
        log::trace!("ConsoleShell: Parsed {line:?} into {input:?}");
        Ok(input)
    }

    /*
     * Applies one command from the explorer logic to the shell's view and
     * prints what changed. `NavigateTo` and `QuitApplication` are handled by
     * the event loop; they are only echoed here.
     */
    pub fn execute_command(&mut self, command: &PlatformCommand) -> PlatformResult<()> {
        match command {
            PlatformCommand::PopulateExplorer { entities } => {
                self.entities = entities.clone();
                self.show()?;
            }
            PlatformCommand::RenderEntity { entity } => {
                match self
                    .entities
                    .iter_mut()
                    .find(|e| e.datasource_id == entity.datasource_id)
                {
                    Some(existing) => *existing = entity.clone(),
                    None => self.entities.push(entity.clone()),
                }
                for line in render_entity(entity) {
                    writeln!(self.out, "{line}")?;
                }
            }
            PlatformCommand::RemoveEntity { datasource_id } => {
                self.entities.retain(|e| &e.datasource_id != datasource_id);
                writeln!(self.out, "- {datasource_id}")?;
            }
            PlatformCommand::NavigateTo { path } => {
                writeln!(self.out, "=> {path}")?;
            }
            PlatformCommand::QuitApplication => {
                writeln!(self.out, "Bye.")?;
            }
        }
        Ok(())
    }

    pub fn show(&mut self) -> PlatformResult<()> {
        writeln!(self.out, "Datasources ({})", self.entities.len())?;
        for entity in &self.entities {
            for line in render_entity(entity) {
                writeln!(self.out, "{line}")?;
            }
        }
        Ok(())
    }

    pub fn print_error(&mut self, error: &PlatformError) -> PlatformResult<()> {
        writeln!(self.out, "! {error}")?;
        Ok(())
    }
}

fn render_table(table: &DatasourceTable, indent: &str, lines: &mut Vec<String>) {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{}: {}", c.name, c.column_type))
        .collect();
    lines.push(format!("{indent}{} [{}]", table.name, columns.join(", ")));
    for key in &table.keys {
        lines.push(match key {
            DatasourceKey::Primary { name, columns } => {
                format!("{indent}{INDENT}PK {name} ({})", columns.join(", "))
            }
            DatasourceKey::Foreign {
                name,
                from_columns,
                to_columns,
            } => format!(
                "{indent}{INDENT}FK {name} ({} -> {})",
                from_columns.join(", "),
                to_columns.join(", ")
            ),
        });
    }
    for template in &table.templates {
        lines.push(format!("{indent}{INDENT}template: {}", template.title));
    }
}

// The text lines for one node: its own row, then its substructure rows if expanded.
pub fn render_entity(entity: &EntityDescriptor) -> Vec<String> {
    let glyph = if entity.expanded { 'v' } else { '>' };
    let marker = if entity.active { '*' } else { ' ' };
    let mut lines = vec![format!(
        "{}{glyph} {marker} [{}] {} ({})",
        INDENT.repeat(entity.step),
        entity.icon_label,
        entity.name,
        entity.datasource_id
    )];
    if !entity.expanded {
        return lines;
    }

    let indent = INDENT.repeat(STRUCTURE_ROW_STEP);
    match &entity.structure {
        // An expanded node whose fetch has not been issued yet renders like a pending one.
        StructureCacheEntry::Absent | StructureCacheEntry::Pending => {
            lines.push(format!("{indent}Loading structure..."));
        }
        StructureCacheEntry::Error(err) => {
            lines.push(format!("{indent}Could not load structure: {err}"));
        }
        StructureCacheEntry::Present(structure) if structure.tables.is_empty() => {
            lines.push(format!("{indent}No tables found"));
        }
        StructureCacheEntry::Present(structure) => {
            for table in &structure.tables {
                render_table(table, &indent, &mut lines);
            }
        }
    }
    lines
}
