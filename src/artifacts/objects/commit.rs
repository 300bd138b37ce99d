//! Commit object
//!
//! Commits represent snapshots of the repository at specific points in time.
//! They contain:
//! - A root tree object ID (directory snapshot)
//! - An optional parent commit ID (absent for a root commit)
//! - Author and committer information
//! - Commit message
//!
//! ## Format
//!
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Offset};
use derive_new::new;
use std::io::{BufRead, Read};

/// Identity as written in commit headers: `name <email>`
#[derive(Debug, Clone, Default, Eq, PartialEq, new)]
pub struct User {
    pub name: String,
    pub email: String,
}

impl User {
    /// Parse `name <email>`
    ///
    /// A string without a ` <...>` suffix is taken whole as the name with an
    /// empty email. This is lossy but never fails.
    pub fn parse(value: &str) -> Self {
        match (value.find(" <"), value.rfind('>')) {
            (Some(split), Some(end)) if end > split => User {
                name: value[..split].to_string(),
                email: value[split + 2..end].to_string(),
            },
            _ => User {
                name: value.to_string(),
                email: String::new(),
            },
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Identity plus the moment it acted
///
/// The timezone is kept as the signed `HHMM` integer found in the header
/// (`+0130` is `130`, `-0800` is `-800`).
#[derive(Debug, Clone, Default, Eq, PartialEq, new)]
pub struct UserWithTime {
    pub user: User,
    pub timestamp: i64,
    pub timezone: i16,
}

impl UserWithTime {
    /// Stamp a user with the current local time
    pub fn now(user: User) -> Self {
        Self::at(user, chrono::Local::now().fixed_offset())
    }

    pub fn at(user: User, datetime: DateTime<FixedOffset>) -> Self {
        let offset_minutes = datetime.offset().fix().local_minus_utc() / 60;
        let timezone = (offset_minutes / 60) * 100 + offset_minutes % 60;

        UserWithTime {
            user,
            timestamp: datetime.timestamp(),
            timezone: timezone as i16,
        }
    }

    /// Load an identity from `GIT_<ROLE>_NAME`, `GIT_<ROLE>_EMAIL` and `GIT_<ROLE>_DATE`
    ///
    /// `role` is `AUTHOR` or `COMMITTER`. The date is optional and accepts RFC 2822
    /// or `%Y-%m-%d %H:%M:%S %z`; without it the current time is used.
    pub fn load_from_env(role: &str) -> Option<Self> {
        let name = std::env::var(format!("GIT_{role}_NAME")).ok()?;
        let email = std::env::var(format!("GIT_{role}_EMAIL")).ok()?;
        let user = User::new(name, email);

        let datetime = std::env::var(format!("GIT_{role}_DATE"))
            .ok()
            .and_then(|date| {
                DateTime::parse_from_rfc2822(&date)
                    .or_else(|_| DateTime::parse_from_str(&date, "%Y-%m-%d %H:%M:%S %z"))
                    .ok()
            });

        Some(match datetime {
            Some(datetime) => Self::at(user, datetime),
            None => Self::now(user),
        })
    }

    /// Parse `name <email> <unixSeconds> <±HHMM>`
    pub fn parse(value: &str) -> Result<Self> {
        let email_end = value.find("> ");
        let space = value.rfind(' ');

        let (email_end, space) = match (email_end, space) {
            (Some(email_end), Some(space)) if space >= email_end + 2 => (email_end, space),
            _ => return Err(Error::InvalidUser(value.to_string())),
        };

        let timestamp = value[email_end + 2..space]
            .parse::<i64>()
            .map_err(|_| Error::InvalidUser(value.to_string()))?;
        let timezone = value[space + 1..]
            .parse::<i16>()
            .map_err(|_| Error::InvalidUser(value.to_string()))?;

        Ok(UserWithTime {
            user: User::parse(&value[..email_end + 1]),
            timestamp,
            timezone,
        })
    }

    /// Timestamp with its recorded offset, if the offset is a valid one
    pub fn datetime(&self) -> Option<DateTime<FixedOffset>> {
        let minutes = i32::from(self.timezone / 100) * 60 + i32::from(self.timezone % 100);
        let offset = FixedOffset::east_opt(minutes * 60)?;

        DateTime::from_timestamp(self.timestamp, 0).map(|utc| utc.with_timezone(&offset))
    }
}

impl std::fmt::Display for UserWithTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {:+05}", self.user, self.timestamp, self.timezone)
    }
}

/// Commit object
///
/// Records a root tree, at most one parent, the author and committer, and a
/// free-form message. A commit without a parent is a root commit.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Tree object ID representing the directory snapshot
    pub tree_oid: ObjectId,
    /// Parent commit ID (None for a root commit)
    pub parent: Option<ObjectId>,
    pub author: UserWithTime,
    pub committer: UserWithTime,
    pub message: String,
}

impl Commit {
    /// Create a root commit whose committer is the author
    pub fn new(tree_oid: ObjectId, author: UserWithTime) -> Self {
        Commit {
            tree_oid,
            parent: None,
            committer: author.clone(),
            author,
            message: String::new(),
        }
    }

    pub fn with_parent(mut self, parent: ObjectId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_committer(mut self, committer: UserWithTime) -> Self {
        self.committer = committer;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// First line of the commit message
    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

impl Packable for Commit {
    fn serialize(&self) -> Bytes {
        let mut payload = format!("tree {}\n", self.tree_oid);
        if let Some(parent) = &self.parent {
            payload.push_str(&format!("parent {parent}\n"));
        }
        payload.push_str(&format!("author {}\n", self.author));
        payload.push_str(&format!("committer {}\n\n", self.committer));
        payload.push_str(&self.message);

        Bytes::from(payload)
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|_| Error::malformed("commit", "payload is not UTF-8"))?;

        let (headers, message) = content
            .split_once("\n\n")
            .ok_or_else(|| Error::malformed("commit", "missing blank line before message"))?;

        let mut tree_oid = None;
        let mut parent = None;
        let mut author = None;
        let mut committer = None;

        for header in headers.split('\n') {
            let Some((name, value)) = header.split_once(' ') else {
                continue;
            };

            match name {
                "tree" => tree_oid = Some(ObjectId::try_parse(value)?),
                "parent" => parent = Some(ObjectId::try_parse(value)?),
                "author" => author = Some(UserWithTime::parse(value)?),
                "committer" => committer = Some(UserWithTime::parse(value)?),
                _ => {}
            }
        }

        let tree_oid = tree_oid.ok_or_else(|| Error::malformed("commit", "missing tree header"))?;
        let author = author.ok_or_else(|| Error::malformed("commit", "missing author header"))?;
        let committer = committer.unwrap_or_else(|| author.clone());

        Ok(Commit {
            tree_oid,
            parent,
            author,
            committer,
            message: message.to_string(),
        })
    }
}
