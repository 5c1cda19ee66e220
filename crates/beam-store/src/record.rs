use beam_types::{Account, Beam, Pool, User};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Account,
    Beam,
    Pool,
}

/// Any stored row, tagged by its entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Record {
    User(User),
    Account(Account),
    Beam(Beam),
    Pool(Pool),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::User(_) => EntityKind::User,
            Record::Account(_) => EntityKind::Account,
            Record::Beam(_) => EntityKind::Beam,
            Record::Pool(_) => EntityKind::Pool,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::User(user) => &user.id,
            Record::Account(account) => &account.id,
            Record::Beam(beam) => &beam.id,
            Record::Pool(pool) => &pool.id,
        }
    }
}

/// Typed view over one [`Record`] variant.
pub trait Entity: Sized + Send + 'static {
    const KIND: EntityKind;

    fn from_record(record: Record) -> Option<Self>;
}

macro_rules! entity {
    ($ty:ident, $kind:ident) => {
        impl Entity for $ty {
            const KIND: EntityKind = EntityKind::$kind;

            fn from_record(record: Record) -> Option<Self> {
                match record {
                    Record::$kind(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Record {
            fn from(value: $ty) -> Self {
                Record::$kind(value)
            }
        }
    };
}

entity!(User, User);
entity!(Account, Account);
entity!(Beam, Beam);
entity!(Pool, Pool);
