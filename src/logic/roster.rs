//! Roster import from CSV.

use crate::models::{PlayerId, Roster, SessionError};

/// Add every name in the first column of `data`. A leading `name` header and blank rows are
/// skipped; names already on the roster are ignored. Returns the ids of newly added players.
pub fn import_roster_csv(roster: &mut Roster, data: &str) -> Result<Vec<PlayerId>, SessionError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let mut added = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| SessionError::Csv(e.to_string()))?;
        let Some(name) = record.get(0).map(str::trim).filter(|n| !n.is_empty()) else {
            continue;
        };
        if line == 0 && name.eq_ignore_ascii_case("name") {
            continue;
        }
        match roster.add(name) {
            Ok(id) => added.push(id),
            Err(SessionError::DuplicatePlayerName) => {
                log::debug!("skipping duplicate roster name '{}'", name);
            }
            Err(e) => return Err(e),
        }
    }
    log::info!("imported {} player(s) from CSV", added.len());
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_blank_rows_and_duplicates_are_skipped() {
        let mut roster = Roster::new();
        roster.add("Ana").unwrap();
        let added = import_roster_csv(&mut roster, "name,level\nBen,3\n\n  Cleo \nana\n").unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!(roster.len(), 3);
        assert!(roster.find_by_name("Cleo").is_some());
    }
}
