//! SQLite store for Amy test data

use crate::types::*;
use crate::{Error, Result};
use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database wrapper holding the test records
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;

        info!("Opened database at {:?}", path.as_ref());
        Ok(db)
    }

    /// Open in-memory database (one per test)
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS sites (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                domain TEXT NOT NULL UNIQUE,
                fullname TEXT NOT NULL,
                country TEXT NOT NULL,
                notes TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS airports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                iata TEXT NOT NULL UNIQUE,
                fullname TEXT NOT NULL,
                country TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS badges (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                criteria TEXT NOT NULL
            );

            -- NULL never collides with NULL under UNIQUE, so optional
            -- handles stay unique only when present.
            CREATE TABLE IF NOT EXISTS persons (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                personal TEXT NOT NULL,
                middle TEXT,
                family TEXT NOT NULL,
                email TEXT UNIQUE,
                gender TEXT NOT NULL DEFAULT 'U',
                active INTEGER NOT NULL DEFAULT 1,
                airport_id INTEGER REFERENCES airports(id),
                github TEXT UNIQUE,
                twitter TEXT UNIQUE,
                url TEXT,
                slug TEXT NOT NULL UNIQUE
            );
            CREATE INDEX IF NOT EXISTS idx_persons_airport ON persons(airport_id);

            CREATE TABLE IF NOT EXISTS awards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                person_id INTEGER NOT NULL REFERENCES persons(id),
                badge_id INTEGER NOT NULL REFERENCES badges(id),
                awarded TEXT NOT NULL,
                UNIQUE (person_id, badge_id)
            );
            CREATE INDEX IF NOT EXISTS idx_awards_person ON awards(person_id);
            "#,
        )?;

        debug!("Database schema initialized");
        Ok(())
    }

    // ========================================================================
    // Create operations
    // ========================================================================

    pub fn create_site(&self, new: NewSite) -> Result<Site> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO sites (domain, fullname, country, notes) VALUES (?1, ?2, ?3, ?4)",
            params![new.domain, new.fullname, new.country, new.notes],
        )
        .map_err(|e| Error::from_insert(e, "site", &new.domain))?;

        let id = SiteId(conn.last_insert_rowid());
        debug!("Inserted site {} with id {}", new.domain, id);
        Ok(Site {
            id,
            domain: new.domain,
            fullname: new.fullname,
            country: new.country,
            notes: new.notes,
        })
    }

    pub fn create_airport(&self, new: NewAirport) -> Result<Airport> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO airports (iata, fullname, country, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![new.iata, new.fullname, new.country, new.latitude, new.longitude],
        )
        .map_err(|e| Error::from_insert(e, "airport", &new.iata))?;

        let id = AirportId(conn.last_insert_rowid());
        debug!("Inserted airport {} with id {}", new.iata, id);
        Ok(Airport {
            id,
            iata: new.iata,
            fullname: new.fullname,
            country: new.country,
            latitude: new.latitude,
            longitude: new.longitude,
        })
    }

    pub fn create_badge(&self, new: NewBadge) -> Result<Badge> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO badges (name, title, criteria) VALUES (?1, ?2, ?3)",
            params![new.name, new.title, new.criteria],
        )
        .map_err(|e| Error::from_insert(e, "badge", &new.name))?;

        let id = BadgeId(conn.last_insert_rowid());
        debug!("Inserted badge {} with id {}", new.name, id);
        Ok(Badge {
            id,
            name: new.name,
            title: new.title,
            criteria: new.criteria,
        })
    }

    pub fn create_person(&self, new: NewPerson) -> Result<Person> {
        if new.slug.is_empty() {
            return Err(Error::InvalidRecord {
                table: Table::Persons.to_string(),
                reason: "slug must not be empty".to_string(),
            });
        }

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO persons (personal, middle, family, email, gender, active,
                                  airport_id, github, twitter, url, slug)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                new.personal,
                new.middle,
                new.family,
                new.email,
                new.gender.code(),
                new.active,
                new.airport.map(|a| a.0),
                new.github,
                new.twitter,
                new.url,
                new.slug,
            ],
        )
        .map_err(|e| Error::from_insert(e, "person", &new.slug))?;

        let id = PersonId(conn.last_insert_rowid());
        debug!("Inserted person {} with id {}", new.slug, id);
        Ok(Person {
            id,
            personal: new.personal,
            middle: new.middle,
            family: new.family,
            email: new.email,
            gender: new.gender,
            active: new.active,
            airport: new.airport,
            github: new.github,
            twitter: new.twitter,
            url: new.url,
            slug: new.slug,
        })
    }

    pub fn create_award(&self, person: &Person, badge: &Badge, awarded: NaiveDate) -> Result<Award> {
        let key = format!("{}/{}", person.slug, badge.name);
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO awards (person_id, badge_id, awarded) VALUES (?1, ?2, ?3)",
            params![person.id.0, badge.id.0, awarded.format(DATE_FORMAT).to_string()],
        )
        .map_err(|e| Error::from_insert(e, "award", &key))?;

        let id = AwardId(conn.last_insert_rowid());
        debug!("Inserted award {} with id {}", key, id);
        Ok(Award {
            id,
            person: person.id,
            badge: badge.id,
            awarded,
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Number of rows in a table
    pub fn count(&self, table: Table) -> Result<usize> {
        let conn = self.conn.lock();
        let n: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.as_str()),
            [],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    pub fn get_airport_by_iata(&self, iata: &str) -> Result<Option<Airport>> {
        let conn = self.conn.lock();
        let airport = conn
            .query_row(
                "SELECT id, iata, fullname, country, latitude, longitude
                 FROM airports WHERE iata = ?1",
                params![iata],
                |row| {
                    Ok(Airport {
                        id: AirportId(row.get(0)?),
                        iata: row.get(1)?,
                        fullname: row.get(2)?,
                        country: row.get(3)?,
                        latitude: row.get(4)?,
                        longitude: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(airport)
    }

    pub fn get_person_by_slug(&self, slug: &str) -> Result<Option<Person>> {
        let conn = self.conn.lock();
        let raw = conn
            .query_row(
                "SELECT id, personal, middle, family, email, gender, active,
                        airport_id, github, twitter, url, slug
                 FROM persons WHERE slug = ?1",
                params![slug],
                |row| {
                    Ok(RawPerson {
                        id: row.get(0)?,
                        personal: row.get(1)?,
                        middle: row.get(2)?,
                        family: row.get(3)?,
                        email: row.get(4)?,
                        gender: row.get(5)?,
                        active: row.get(6)?,
                        airport_id: row.get(7)?,
                        github: row.get(8)?,
                        twitter: row.get(9)?,
                        url: row.get(10)?,
                        slug: row.get(11)?,
                    })
                },
            )
            .optional()?;

        raw.map(RawPerson::parse).transpose()
    }

    /// Awards held by a person, oldest first
    pub fn awards_for_person(&self, person: PersonId) -> Result<Vec<Award>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, person_id, badge_id, awarded FROM awards
             WHERE person_id = ?1 ORDER BY awarded, id",
        )?;

        let rows = stmt.query_map(params![person.0], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut awards = Vec::new();
        for row in rows {
            let (id, person_id, badge_id, awarded) = row?;
            awards.push(Award {
                id: AwardId(id),
                person: PersonId(person_id),
                badge: BadgeId(badge_id),
                awarded: parse_date(&awarded)?,
            });
        }
        Ok(awards)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| Error::InvalidRecord {
        table: Table::Awards.to_string(),
        reason: format!("bad award date {:?}: {}", value, e),
    })
}

/// Person row before column decoding
struct RawPerson {
    id: i64,
    personal: String,
    middle: Option<String>,
    family: String,
    email: Option<String>,
    gender: String,
    active: bool,
    airport_id: Option<i64>,
    github: Option<String>,
    twitter: Option<String>,
    url: Option<String>,
    slug: String,
}

impl RawPerson {
    fn parse(self) -> Result<Person> {
        let gender = Gender::from_code(&self.gender).ok_or_else(|| Error::InvalidRecord {
            table: Table::Persons.to_string(),
            reason: format!("unknown gender code {:?} for {}", self.gender, self.slug),
        })?;

        Ok(Person {
            id: PersonId(self.id),
            personal: self.personal,
            middle: self.middle,
            family: self.family,
            email: self.email,
            gender,
            active: self.active,
            airport: self.airport_id.map(AirportId),
            github: self.github,
            twitter: self.twitter,
            url: self.url,
            slug: self.slug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airport(db: &Database, iata: &str) -> Airport {
        db.create_airport(NewAirport {
            iata: iata.to_string(),
            fullname: format!("Airport {}", iata),
            country: "Albania".to_string(),
            latitude: 1.5,
            longitude: -2.0,
        })
        .unwrap()
    }

    fn person(slug: &str, email: Option<&str>, airport: Option<AirportId>) -> NewPerson {
        NewPerson {
            personal: "Test".to_string(),
            family: "Person".to_string(),
            email: email.map(String::from),
            gender: Gender::Other,
            active: true,
            airport,
            slug: slug.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_and_fetch_person() {
        let db = Database::open_memory().unwrap();
        let aaa = airport(&db, "AAA");

        let created = db
            .create_person(NewPerson {
                github: Some("tester".to_string()),
                url: Some("http://example.org".to_string()),
                ..person("person.t", Some("t@example.org"), Some(aaa.id))
            })
            .unwrap();

        let fetched = db.get_person_by_slug("person.t").unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.airport, Some(aaa.id));
        assert!(db.get_person_by_slug("missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_iata_is_already_exists() {
        let db = Database::open_memory().unwrap();
        airport(&db, "AAA");

        let err = db
            .create_airport(NewAirport {
                iata: "AAA".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        match err {
            Error::AlreadyExists { kind, id } => {
                assert_eq!(kind, "airport");
                assert_eq!(id, "AAA");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(db.count(Table::Airports).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_email_is_rejected_but_missing_email_is_not() {
        let db = Database::open_memory().unwrap();
        db.create_person(person("a", Some("same@example.org"), None)).unwrap();

        let err = db
            .create_person(person("b", Some("same@example.org"), None))
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));

        db.create_person(person("c", None, None)).unwrap();
        db.create_person(person("d", None, None)).unwrap();
        assert_eq!(db.count(Table::Persons).unwrap(), 3);
    }

    #[test]
    fn test_dangling_airport_is_not_found() {
        let db = Database::open_memory().unwrap();
        let err = db
            .create_person(person("ghost", None, Some(AirportId(42))))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }), "got {err}");
    }

    #[test]
    fn test_empty_slug_is_invalid() {
        let db = Database::open_memory().unwrap();
        let err = db.create_person(person("", None, None)).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { .. }));
    }

    #[test]
    fn test_award_once_per_badge() {
        let db = Database::open_memory().unwrap();
        let p = db.create_person(person("p", None, None)).unwrap();
        let b = db
            .create_badge(NewBadge {
                name: "instructor".to_string(),
                title: "Instructor".to_string(),
                criteria: String::new(),
            })
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();

        let award = db.create_award(&p, &b, date).unwrap();
        assert!(matches!(
            db.create_award(&p, &b, date),
            Err(Error::AlreadyExists { .. })
        ));

        let awards = db.awards_for_person(p.id).unwrap();
        assert_eq!(awards, vec![award]);
    }

    #[test]
    fn test_open_file_database_is_reusable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amy.db");

        {
            let db = Database::open(&path).unwrap();
            airport(&db, "ZZZ");
        }

        let db = Database::open(&path).unwrap();
        assert!(db.get_airport_by_iata("ZZZ").unwrap().is_some());
    }
}
