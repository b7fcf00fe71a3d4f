#![allow(dead_code)]

//! Readers and type definitions for the Day One Core Data SQLite schema.
//!
//! Core Data prefixes every table and column with `Z`. Only the tables this
//! tool consumes are modeled:
//!
//! ```sql
//! ZJOURNAL    (Z_PK, ZNAME)
//! ZENTRY      (Z_PK, ZGREGORIANYEAR, ZGREGORIANMONTH, ZGREGORIANDAY,
//!              ZCREATIONDATE, ZMARKDOWNTEXT, ZSTARRED, ZJOURNAL,
//!              ZLOCATION, ZWEATHER, ZUUID)
//! ZTAG        (Z_PK, ZNAME)   -- linked through Z_17TAGS (Z_17ENTRIES, Z_62TAGS1)
//! ZLOCATION   (Z_PK, ZPLACENAME, ZLOCALITYNAME, ZADMINISTRATIVEAREA,
//!              ZCOUNTRY, ZLATITUDE, ZLONGITUDE)
//! ZWEATHER    (Z_PK, ZCONDITIONSDESCRIPTION, ZTEMPERATURECELSIUS,
//!              ZRELATIVEHUMIDITY)
//! ZATTACHMENT (ZIDENTIFIER, ZTYPE, ZMD5, ZENTRY)
//! ```
//!
//! `ZCREATIONDATE` is a Core Data timestamp: float seconds since
//! 2001-01-01T00:00:00, not the Unix epoch.
//!
//! Metadata readers distinguish absence from failure: a missing row or NULL
//! foreign key is `Ok(None)` / an empty `Vec`, while a failed query (schema
//! drift, corrupt store) is `Err`. The pipeline collapses failures to empty
//! values; tests can still tell the two apart.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use eyre::{Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

/// Reference instant for Core Data timestamps.
fn core_data_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2001, 1, 1)
        .expect("valid reference date")
        .and_hms_opt(0, 0, 0)
        .expect("valid reference time")
}

/// All entries in ascending creation-time order. Within-day ordering of
/// rendered blocks relies on this ORDER BY.
pub const ENTRY_QUERY: &str = "\
    SELECT
        e.Z_PK,
        e.ZGREGORIANYEAR,
        e.ZGREGORIANMONTH,
        e.ZGREGORIANDAY,
        e.ZCREATIONDATE,
        e.ZMARKDOWNTEXT,
        e.ZSTARRED,
        e.ZJOURNAL,
        e.ZLOCATION,
        e.ZWEATHER,
        e.ZUUID
    FROM ZENTRY e
    ORDER BY e.ZCREATIONDATE ASC";

/// One row of `ZENTRY`, in query column order.
#[derive(Debug, Clone)]
pub struct EntryRow {
    pub pk: i64,
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub day: Option<i64>,
    pub creation: Option<f64>,
    pub text: Option<String>,
    pub starred: bool,
    pub journal: Option<i64>,
    pub location: Option<i64>,
    pub weather: Option<i64>,
    pub uuid: Option<String>,
}

impl EntryRow {
    /// Calendar day this entry is filed under.
    ///
    /// Explicit Gregorian fields win when they form a valid date; otherwise
    /// the creation timestamp is interpreted as seconds from the Core Data
    /// reference instant. Entries with neither have no day.
    pub fn date(&self) -> Option<NaiveDate> {
        if let (Some(y), Some(m), Some(d)) = (self.year, self.month, self.day)
            && let Some(date) = NaiveDate::from_ymd_opt(y as i32, m as u32, d as u32)
        {
            return Some(date);
        }
        let secs = self.creation?;
        let delta = TimeDelta::try_seconds(secs.floor() as i64)?;
        Some(core_data_epoch().checked_add_signed(delta)?.date())
    }
}

/// Flat attribute bag from `ZLOCATION`.
#[derive(Debug, Clone, Default)]
pub struct Location {
    pub place: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Flat attribute bag from `ZWEATHER`.
#[derive(Debug, Clone, Default)]
pub struct Weather {
    pub conditions: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// Media reference belonging to an entry. `md5` names the file on disk;
/// `identifier` is what entry text refers to.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub identifier: Option<String>,
    pub kind: Option<String>,
    pub md5: Option<String>,
}

/// Open a Day One store (or a snapshot of one) for reading.
pub fn open_readonly(path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .wrap_err_with(|| format!("Failed to open database: {}", path.display()))
}

/// Load the journal-name table, normalizing unusable names.
///
/// A NULL or empty name becomes `Journal-<pk>`. Day One names auto-created
/// journals with a bare UUID; those render as `Unnamed Journal`.
pub fn journal_names(conn: &Connection) -> Result<HashMap<i64, String>> {
    let mut stmt = conn
        .prepare("SELECT Z_PK, ZNAME FROM ZJOURNAL")
        .wrap_err("Failed to prepare journal query")?;
    let mut rows = stmt.query([]).wrap_err("Failed to query journals")?;

    let mut journals = HashMap::new();
    while let Some(row) = rows.next().wrap_err("Failed to read journal row")? {
        let pk: i64 = row.get(0)?;
        let name: Option<String> = row.get(1)?;
        journals.insert(pk, normalize_journal_name(pk, name));
    }
    Ok(journals)
}

fn normalize_journal_name(pk: i64, name: Option<String>) -> String {
    match name {
        Some(name) if !name.is_empty() => {
            if name.len() == 36 && Uuid::try_parse(&name).is_ok() {
                "Unnamed Journal".to_string()
            } else {
                name
            }
        }
        _ => format!("Journal-{pk}"),
    }
}

/// Row mapper matching [`ENTRY_QUERY`]'s column order.
pub fn entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EntryRow> {
    Ok(EntryRow {
        pk: row.get(0)?,
        year: row.get(1)?,
        month: row.get(2)?,
        day: row.get(3)?,
        creation: row.get(4)?,
        text: row.get(5)?,
        starred: row.get::<_, Option<bool>>(6)?.unwrap_or(false),
        journal: row.get(7)?,
        location: row.get(8)?,
        weather: row.get(9)?,
        uuid: row.get(10)?,
    })
}

/// Tag names attached to an entry through the Core Data join table.
pub fn tags_for_entry(conn: &Connection, entry_pk: i64) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT t.ZNAME FROM ZTAG t
             JOIN Z_17TAGS et ON t.Z_PK = et.Z_62TAGS1
             WHERE et.Z_17ENTRIES = ?",
        )
        .wrap_err("Failed to prepare tag query")?;
    let rows = stmt
        .query_map([entry_pk], |row| row.get::<_, Option<String>>(0))
        .wrap_err("Failed to query tags")?;

    let mut tags = Vec::new();
    for name in rows {
        let name = name.wrap_err("Failed to read tag row")?;
        if let Some(name) = name
            && !name.is_empty()
        {
            tags.push(name);
        }
    }
    Ok(tags)
}

/// Location bag for an entry; `None` when the entry carries no location
/// reference or the referenced row is gone.
pub fn location_for_entry(conn: &Connection, location_pk: Option<i64>) -> Result<Option<Location>> {
    let Some(pk) = location_pk else {
        return Ok(None);
    };
    conn.query_row(
        "SELECT ZPLACENAME, ZLOCALITYNAME, ZADMINISTRATIVEAREA, ZCOUNTRY, ZLATITUDE, ZLONGITUDE
         FROM ZLOCATION WHERE Z_PK = ?",
        [pk],
        |row| {
            Ok(Location {
                place: row.get(0)?,
                locality: row.get(1)?,
                region: row.get(2)?,
                country: row.get(3)?,
                latitude: row.get(4)?,
                longitude: row.get(5)?,
            })
        },
    )
    .optional()
    .wrap_err("Failed to query location")
}

/// Weather bag for an entry; same absence semantics as the location reader.
pub fn weather_for_entry(conn: &Connection, weather_pk: Option<i64>) -> Result<Option<Weather>> {
    let Some(pk) = weather_pk else {
        return Ok(None);
    };
    conn.query_row(
        "SELECT ZCONDITIONSDESCRIPTION, ZTEMPERATURECELSIUS, ZRELATIVEHUMIDITY
         FROM ZWEATHER WHERE Z_PK = ?",
        [pk],
        |row| {
            Ok(Weather {
                conditions: row.get(0)?,
                temperature: row.get(1)?,
                humidity: row.get(2)?,
            })
        },
    )
    .optional()
    .wrap_err("Failed to query weather")
}

/// Photo/video/audio references for an entry.
pub fn attachments_for_entry(conn: &Connection, entry_pk: i64) -> Result<Vec<Attachment>> {
    let mut stmt = conn
        .prepare("SELECT ZIDENTIFIER, ZTYPE, ZMD5 FROM ZATTACHMENT WHERE ZENTRY = ?")
        .wrap_err("Failed to prepare attachment query")?;
    let rows = stmt
        .query_map([entry_pk], |row| {
            Ok(Attachment {
                identifier: row.get(0)?,
                kind: row.get(1)?,
                md5: row.get(2)?,
            })
        })
        .wrap_err("Failed to query attachments")?;
    rows.collect::<rusqlite::Result<_>>()
        .wrap_err("Failed to read attachment rows")
}


#[cfg(test)]
mod tests {
    use super::fixtures::{self, EntryFixture};
    use super::*;
    use rusqlite::params;

    fn fixture_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        fixtures::dayone_schema(&conn);
        conn
    }

    #[test]
    fn journal_names_are_normalized() {
        let conn = fixture_conn();
        fixtures::insert_journal(&conn, 1, Some("Travel"));
        fixtures::insert_journal(&conn, 2, None);
        fixtures::insert_journal(&conn, 3, Some("b8a2ef44-12fa-4c83-90dd-85a9887efa23"));
        fixtures::insert_journal(&conn, 4, Some(""));

        let journals = journal_names(&conn).unwrap();
        assert_eq!(journals[&1], "Travel");
        assert_eq!(journals[&2], "Journal-2");
        assert_eq!(journals[&3], "Unnamed Journal");
        assert_eq!(journals[&4], "Journal-4");
    }

    #[test]
    fn uuid_lookalike_with_bad_hex_keeps_its_name() {
        let name = "zzzzzzzz-12fa-4c83-90dd-85a9887efa23";
        assert_eq!(name.len(), 36);
        let conn = fixture_conn();
        fixtures::insert_journal(&conn, 1, Some(name));
        let journals = journal_names(&conn).unwrap();
        assert_eq!(journals[&1], name);
    }

    #[test]
    fn tags_follow_the_join_table_and_drop_blanks() {
        let conn = fixture_conn();
        fixtures::insert_entry(
            &conn,
            EntryFixture {
                pk: 7,
                text: Some("x"),
                ..Default::default()
            },
        );
        fixtures::insert_tag(&conn, 1, Some("food"), 7);
        fixtures::insert_tag(&conn, 2, Some("trip"), 7);
        fixtures::insert_tag(&conn, 3, None, 7);
        fixtures::insert_tag(&conn, 4, Some("other"), 8);

        let tags = tags_for_entry(&conn, 7).unwrap();
        assert_eq!(tags, vec!["food".to_string(), "trip".to_string()]);
    }

    #[test]
    fn absent_foreign_keys_read_as_none_without_querying() {
        let conn = Connection::open_in_memory().unwrap();
        // No schema at all: a real query would fail, a None key must not.
        assert!(location_for_entry(&conn, None).unwrap().is_none());
        assert!(weather_for_entry(&conn, None).unwrap().is_none());
    }

    #[test]
    fn lookup_failure_is_an_error_not_an_empty_bag() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(tags_for_entry(&conn, 1).is_err());
        assert!(location_for_entry(&conn, Some(1)).is_err());
        assert!(weather_for_entry(&conn, Some(1)).is_err());
        assert!(attachments_for_entry(&conn, 1).is_err());
    }

    #[test]
    fn dangling_location_reference_is_none() {
        let conn = fixture_conn();
        assert!(location_for_entry(&conn, Some(99)).unwrap().is_none());
    }

    #[test]
    fn location_reader_returns_all_columns() {
        let conn = fixture_conn();
        conn.execute(
            "INSERT INTO ZLOCATION (Z_PK, ZPLACENAME, ZLOCALITYNAME, ZADMINISTRATIVEAREA,
                                    ZCOUNTRY, ZLATITUDE, ZLONGITUDE)
             VALUES (5, 'Cafe', 'Lisbon', 'Lisbon District', 'Portugal', 38.7, -9.1)",
            [],
        )
        .unwrap();

        let loc = location_for_entry(&conn, Some(5)).unwrap().unwrap();
        assert_eq!(loc.locality.as_deref(), Some("Lisbon"));
        assert_eq!(loc.country.as_deref(), Some("Portugal"));
        assert_eq!(loc.latitude, Some(38.7));
    }

    #[test]
    fn weather_reader_handles_partial_rows() {
        let conn = fixture_conn();
        conn.execute(
            "INSERT INTO ZWEATHER (Z_PK, ZCONDITIONSDESCRIPTION) VALUES (2, 'Cloudy')",
            [],
        )
        .unwrap();

        let weather = weather_for_entry(&conn, Some(2)).unwrap().unwrap();
        assert_eq!(weather.conditions.as_deref(), Some("Cloudy"));
        assert_eq!(weather.temperature, None);
    }

    #[test]
    fn attachments_read_in_full() {
        let conn = fixture_conn();
        fixtures::insert_attachment(&conn, 7, "ABCD1234", "photo", Some("deadbeef"));
        fixtures::insert_attachment(&conn, 7, "EF567890", "audio", None);

        let atts = attachments_for_entry(&conn, 7).unwrap();
        assert_eq!(atts.len(), 2);
        assert_eq!(atts[0].md5.as_deref(), Some("deadbeef"));
        assert_eq!(atts[1].md5, None);
    }

    #[test]
    fn explicit_calendar_fields_beat_the_timestamp() {
        let row = EntryRow {
            pk: 1,
            year: Some(2026),
            month: Some(1),
            day: Some(5),
            creation: Some(1.0e9),
            text: None,
            starred: false,
            journal: None,
            location: None,
            weather: None,
            uuid: None,
        };
        assert_eq!(row.date(), NaiveDate::from_ymd_opt(2026, 1, 5));
    }

    #[test]
    fn timestamp_fallback_counts_from_the_core_data_epoch() {
        let expected = NaiveDate::from_ymd_opt(2020, 5, 17).unwrap();
        let epoch = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        let secs = expected.signed_duration_since(epoch).num_seconds() as f64 + 7_200.5;

        let row = EntryRow {
            pk: 1,
            year: None,
            month: None,
            day: None,
            creation: Some(secs),
            text: None,
            starred: false,
            journal: None,
            location: None,
            weather: None,
            uuid: None,
        };
        assert_eq!(row.date(), Some(expected));
    }

    #[test]
    fn invalid_calendar_fields_fall_back_to_the_timestamp() {
        let row = EntryRow {
            pk: 1,
            year: Some(2026),
            month: Some(13),
            day: Some(40),
            creation: Some(86_400.0),
            text: None,
            starred: false,
            journal: None,
            location: None,
            weather: None,
            uuid: None,
        };
        assert_eq!(row.date(), NaiveDate::from_ymd_opt(2001, 1, 2));
    }

    #[test]
    fn negative_and_fractional_timestamps_floor_correctly() {
        let mut row = EntryRow {
            pk: 1,
            year: None,
            month: None,
            day: None,
            creation: Some(-1.0),
            text: None,
            starred: false,
            journal: None,
            location: None,
            weather: None,
            uuid: None,
        };
        assert_eq!(row.date(), NaiveDate::from_ymd_opt(2000, 12, 31));

        row.creation = Some(-0.5);
        assert_eq!(row.date(), NaiveDate::from_ymd_opt(2000, 12, 31));

        row.creation = Some(86_399.5);
        assert_eq!(row.date(), NaiveDate::from_ymd_opt(2001, 1, 1));
    }

    #[test]
    fn entry_without_any_date_information_has_no_day() {
        let row = EntryRow {
            pk: 1,
            year: None,
            month: None,
            day: None,
            creation: None,
            text: None,
            starred: false,
            journal: None,
            location: None,
            weather: None,
            uuid: None,
        };
        assert_eq!(row.date(), None);
    }

    #[test]
    fn entry_query_orders_by_creation_time() {
        let conn = fixture_conn();
        fixtures::insert_entry(
            &conn,
            EntryFixture {
                pk: 1,
                creation: Some(200.0),
                text: Some("second"),
                ..Default::default()
            },
        );
        fixtures::insert_entry(
            &conn,
            EntryFixture {
                pk: 2,
                creation: Some(100.0),
                text: Some("first"),
                ..Default::default()
            },
        );

        let mut stmt = conn.prepare(ENTRY_QUERY).unwrap();
        let texts: Vec<String> = stmt
            .query_map([], entry_from_row)
            .unwrap()
            .map(|row| row.unwrap().text.unwrap())
            .collect();
        assert_eq!(texts, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn starred_column_tolerates_null() {
        let conn = fixture_conn();
        conn.execute(
            "INSERT INTO ZENTRY (Z_PK, ZMARKDOWNTEXT, ZSTARRED) VALUES (1, 'x', NULL)",
            params![],
        )
        .unwrap();

        let mut stmt = conn.prepare(ENTRY_QUERY).unwrap();
        let rows: Vec<EntryRow> = stmt
            .query_map([], entry_from_row)
            .unwrap()
            .map(|row| row.unwrap())
            .collect();
        assert!(!rows[0].starred);
    }
}
