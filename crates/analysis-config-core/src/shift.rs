//! Shift helpers: column aliases and lookup by source.

use tracing::debug;

use crate::error::{AnalysisConfigError, Result};
use crate::model::{Config, Shift, ShiftDirection};

/// Fields of a [`Shift`] that can be injected into alias templates.
pub const TEMPLATE_FIELDS: &[&str] = &["name", "id", "source", "direction", "label"];

/// Register column `aliases` on the up and down shifts of `shift_source`.
///
/// Aliases map alias targets to alias sources. Both sides are templates in
/// which `{name}`, `{id}`, `{source}`, `{direction}` and `{label}` are
/// replaced by the attributes of the respective shift; `{{` and `}}` produce
/// literal braces. Existing aliases of the shifts are kept unless overwritten.
///
/// ```rust
/// use analysis_config_core::model::{Config, Shift};
/// use analysis_config_core::shift::add_shift_aliases;
///
/// let mut config = Config::new("run2", 1);
/// config.add_shift(Shift::new("pdf_up", 10)?)?;
/// config.add_shift(Shift::new("pdf_down", 11)?)?;
///
/// add_shift_aliases(&mut config, "pdf", [("pdf_weight", "pdf_weight_{direction}")])?;
/// let up = config.get_shift("pdf_up")?;
/// assert_eq!(up.column_aliases["pdf_weight"], "pdf_weight_up");
/// # Ok::<(), analysis_config_core::AnalysisConfigError>(())
/// ```
pub fn add_shift_aliases<I, K, V>(
    config: &mut Config,
    shift_source: &str,
    aliases: I,
) -> Result<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let aliases: Vec<(K, V)> = aliases.into_iter().collect();

    for direction in [ShiftDirection::Up, ShiftDirection::Down] {
        let shift = config.get_shift_mut(&Shift::join_name(shift_source, direction))?;

        let mut rendered = Vec::with_capacity(aliases.len());
        for (key, value) in &aliases {
            rendered.push((
                render_template(key.as_ref(), shift)?,
                render_template(value.as_ref(), shift)?,
            ));
        }
        debug!(shift = %shift.name, aliases = rendered.len(), "adding column aliases");
        shift.column_aliases.extend(rendered);
    }

    Ok(())
}

/// Up and down shifts for each of `shift_sources`, in order.
pub fn get_shifts_from_sources<'a, S>(
    config: &'a Config,
    shift_sources: &[S],
) -> Result<Vec<&'a Shift>>
where
    S: AsRef<str>,
{
    let mut shifts = Vec::with_capacity(shift_sources.len() * 2);
    for source in shift_sources {
        for direction in [ShiftDirection::Up, ShiftDirection::Down] {
            shifts.push(config.get_shift(&Shift::join_name(source.as_ref(), direction))?);
        }
    }
    Ok(shifts)
}

/// Substitute shift fields into `template`.
pub fn render_template(template: &str, shift: &Shift) -> Result<String> {
    let invalid = |message: &str| AnalysisConfigError::InvalidTemplate {
        template: template.to_string(),
        message: message.to_string(),
    };

    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') => return Err(invalid("nested '{' in field")),
                        Some(c) => field.push(c),
                        None => return Err(invalid("unclosed '{'")),
                    }
                }
                out.push_str(&shift_field(shift, &field).ok_or_else(|| {
                    AnalysisConfigError::UnknownTemplateField {
                        template: template.to_string(),
                        field: field.clone(),
                    }
                })?);
            }
            '}' => return Err(invalid("single '}' encountered")),
            c => out.push(c),
        }
    }

    Ok(out)
}

fn shift_field(shift: &Shift, field: &str) -> Option<String> {
    match field {
        "name" => Some(shift.name.clone()),
        "id" => Some(shift.id.to_string()),
        "source" => Some(shift.source.clone()),
        "direction" => Some(shift.direction.to_string()),
        "label" => Some(shift.label.clone().unwrap_or_else(|| shift.name.clone())),
        _ => None,
    }
}
