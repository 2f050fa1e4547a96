// formats.rs - Sequence identifier parsing conventions

use chrono::NaiveDate;
use regex::Regex;

/// Identifier plus whatever sample metadata the naming convention carries
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedId {
    pub id: String,
    pub sample_date: Option<NaiveDate>,
}

impl ParsedId {
    pub fn plain(id: &str) -> Self {
        Self {
            id: id.to_string(),
            sample_date: None,
        }
    }
}

/// Closed set of sequence id naming conventions
///
/// `Aeh` expects `ID | sample_date | other fields`, `Lanl` expects
/// `subtype_country_id_year` (possibly with trailing fields), `Plain` treats the
/// whole string as the id, and `Regexp` extracts the first capture group of a
/// user-supplied pattern.
#[derive(Debug, Clone)]
pub enum IdFormat {
    Aeh,
    Lanl,
    Plain,
    Regexp(Regex),
}

/// Date spellings tolerated in the AEH sample-date field
const AEH_DATE_FORMATS: &[&str] = &["%m%d%Y", "%m-%d-%Y", "%m/%d/%Y", "%Y-%m-%d"];

impl IdFormat {
    /// Resolve a format by name, with an optional pattern for `regexp`
    pub fn from_name(name: &str, pattern: Option<&str>) -> Result<Self, String> {
        match name {
            "AEH" => Ok(IdFormat::Aeh),
            "LANL" => Ok(IdFormat::Lanl),
            "plain" => Ok(IdFormat::Plain),
            "regexp" => {
                let pattern = pattern.ok_or_else(|| {
                    "Format 'regexp' requires a pattern (--parser)".to_string()
                })?;
                let compiled = Regex::new(pattern)
                    .map_err(|e| format!("Invalid id pattern '{}': {}", pattern, e))?;
                Ok(IdFormat::Regexp(compiled))
            }
            other => Err(format!(
                "'{}' is not a valid setting for 'format' (must be one of AEH, LANL, plain, regexp)",
                other
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IdFormat::Aeh => "AEH",
            IdFormat::Lanl => "LANL",
            IdFormat::Plain => "plain",
            IdFormat::Regexp(_) => "regexp",
        }
    }

    /// Parse a raw sequence label into an id and optional sample date
    pub fn parse(&self, label: &str) -> Result<ParsedId, String> {
        let label = label.trim();
        if label.is_empty() {
            return Err("Empty sequence id".to_string());
        }

        match self {
            IdFormat::Plain => Ok(ParsedId::plain(label)),

            IdFormat::Aeh => {
                let fields: Vec<&str> = label.split('|').map(|f| f.trim()).collect();
                if fields.len() < 2 {
                    return Err(format!(
                        "AEH id '{}' must have at least 2 '|'-separated fields",
                        label
                    ));
                }
                let sample_date = parse_aeh_date(fields[1]).ok_or_else(|| {
                    format!("AEH id '{}' has unparseable sample date '{}'", label, fields[1])
                })?;
                Ok(ParsedId {
                    id: fields[0].to_string(),
                    sample_date: Some(sample_date),
                })
            }

            IdFormat::Lanl => {
                let fields: Vec<&str> = label.split('_').collect();
                if fields.len() < 4 {
                    return Err(format!(
                        "LANL id '{}' must have at least 4 '_'-separated fields",
                        label
                    ));
                }
                let year: i32 = fields[3]
                    .parse()
                    .map_err(|_| format!("LANL id '{}' has invalid year '{}'", label, fields[3]))?;
                let sample_date = NaiveDate::from_ymd_opt(year, 1, 1)
                    .ok_or_else(|| format!("LANL id '{}' has out-of-range year {}", label, year))?;
                Ok(ParsedId {
                    id: fields[2].to_string(),
                    sample_date: Some(sample_date),
                })
            }

            IdFormat::Regexp(pattern) => {
                let captures = pattern
                    .captures(label)
                    .ok_or_else(|| format!("Id '{}' does not match the supplied pattern", label))?;
                let id = captures
                    .get(1)
                    .ok_or_else(|| "Id pattern must define at least one capture group".to_string())?
                    .as_str();
                Ok(ParsedId::plain(id))
            }
        }
    }
}

fn parse_aeh_date(field: &str) -> Option<NaiveDate> {
    AEH_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(field, fmt).ok())
}
