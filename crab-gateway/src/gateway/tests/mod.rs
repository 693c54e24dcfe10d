//! Gateway scenarios against an in-memory database

mod shifts;
