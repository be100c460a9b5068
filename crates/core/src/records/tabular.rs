//! Column layouts of every table the pipeline persists.

use crate::table::{Column, ColumnType, FieldReader, Result, Schema, TableRow, Value};

use super::types::{
    ActivityRecord, ArtistRow, CatalogRecord, SongPlayRow, SongRow, TimeRow, UserRow,
};

use ColumnType::{Float64, Int32, Int64, Timestamp, Utf8};

pub const CATALOG_SCHEMA: &[Column] = &[
    Column::required("song_id", Utf8),
    Column::nullable("num_songs", Int64),
    Column::required("title", Utf8),
    Column::required("artist_id", Utf8),
    Column::required("artist_name", Utf8),
    Column::nullable("artist_location", Utf8),
    Column::nullable("artist_latitude", Float64),
    Column::nullable("artist_longitude", Float64),
    Column::required("year", Int64),
    Column::required("duration", Float64),
];

pub const ACTIVITY_SCHEMA: &[Column] = &[
    Column::nullable("artist", Utf8),
    Column::nullable("auth", Utf8),
    Column::nullable("firstName", Utf8),
    Column::nullable("gender", Utf8),
    Column::nullable("itemInSession", Int64),
    Column::nullable("lastName", Utf8),
    Column::nullable("length", Float64),
    Column::nullable("level", Utf8),
    Column::nullable("location", Utf8),
    Column::nullable("method", Utf8),
    Column::required("page", Utf8),
    Column::nullable("registration", Float64),
    Column::required("sessionId", Int64),
    Column::nullable("song", Utf8),
    Column::nullable("status", Int64),
    Column::required("ts", Int64),
    Column::nullable("userAgent", Utf8),
    Column::nullable("userId", Utf8),
];

pub const SONGS_SCHEMA: &[Column] = &[
    Column::required("song_id", Utf8),
    Column::required("title", Utf8),
    Column::required("artist_id", Utf8),
    Column::required("year", Int64),
    Column::required("duration", Float64),
];

pub const ARTISTS_SCHEMA: &[Column] = &[
    Column::required("artist_id", Utf8),
    Column::required("name", Utf8),
    Column::nullable("location", Utf8),
    Column::nullable("latitude", Float64),
    Column::nullable("longitude", Float64),
];

pub const USERS_SCHEMA: &[Column] = &[
    Column::nullable("user_id", Utf8),
    Column::nullable("first_name", Utf8),
    Column::nullable("last_name", Utf8),
    Column::nullable("gender", Utf8),
    Column::nullable("level", Utf8),
];

pub const TIME_SCHEMA: &[Column] = &[
    Column::required("start_time", Timestamp),
    Column::required("hour", Int32),
    Column::required("day", Int32),
    Column::required("week", Int32),
    Column::required("month", Int32),
    Column::required("year", Int32),
    Column::required("weekday", Int32),
];

pub const SONGPLAYS_SCHEMA: &[Column] = &[
    Column::required("start_time", Timestamp),
    Column::nullable("user_id", Utf8),
    Column::nullable("level", Utf8),
    Column::nullable("song_id", Utf8),
    Column::nullable("artist_id", Utf8),
    Column::required("session_id", Int64),
    Column::nullable("location", Utf8),
    Column::nullable("user_agent", Utf8),
    Column::required("year", Int32),
    Column::required("month", Int32),
];

impl TableRow for CatalogRecord {
    fn schema() -> Schema {
        CATALOG_SCHEMA
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Utf8(self.song_id.clone()),
            self.num_songs.into(),
            Value::Utf8(self.title.clone()),
            Value::Utf8(self.artist_id.clone()),
            Value::Utf8(self.artist_name.clone()),
            self.artist_location.clone().into(),
            self.artist_latitude.into(),
            self.artist_longitude.into(),
            Value::Int64(self.year),
            Value::Float64(self.duration),
        ]
    }

    fn from_values(values: Vec<Value>) -> Result<Self> {
        let mut fields = FieldReader::new(Self::schema(), values)?;
        Ok(Self {
            song_id: fields.next()?,
            num_songs: fields.next()?,
            title: fields.next()?,
            artist_id: fields.next()?,
            artist_name: fields.next()?,
            artist_location: fields.next()?,
            artist_latitude: fields.next()?,
            artist_longitude: fields.next()?,
            year: fields.next()?,
            duration: fields.next()?,
        })
    }
}

impl TableRow for ActivityRecord {
    fn schema() -> Schema {
        ACTIVITY_SCHEMA
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.artist.clone().into(),
            self.auth.clone().into(),
            self.first_name.clone().into(),
            self.gender.clone().into(),
            self.item_in_session.into(),
            self.last_name.clone().into(),
            self.length.into(),
            self.level.clone().into(),
            self.location.clone().into(),
            self.method.clone().into(),
            Value::Utf8(self.page.clone()),
            self.registration.into(),
            Value::Int64(self.session_id),
            self.song.clone().into(),
            self.status.into(),
            Value::Int64(self.ts),
            self.user_agent.clone().into(),
            self.user_id.clone().into(),
        ]
    }

    fn from_values(values: Vec<Value>) -> Result<Self> {
        let mut fields = FieldReader::new(Self::schema(), values)?;
        Ok(Self {
            artist: fields.next()?,
            auth: fields.next()?,
            first_name: fields.next()?,
            gender: fields.next()?,
            item_in_session: fields.next()?,
            last_name: fields.next()?,
            length: fields.next()?,
            level: fields.next()?,
            location: fields.next()?,
            method: fields.next()?,
            page: fields.next()?,
            registration: fields.next()?,
            session_id: fields.next()?,
            song: fields.next()?,
            status: fields.next()?,
            ts: fields.next()?,
            user_agent: fields.next()?,
            user_id: fields.next()?,
        })
    }
}

impl TableRow for SongRow {
    fn schema() -> Schema {
        SONGS_SCHEMA
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Utf8(self.song_id.clone()),
            Value::Utf8(self.title.clone()),
            Value::Utf8(self.artist_id.clone()),
            Value::Int64(self.year),
            Value::Float64(self.duration),
        ]
    }

    fn from_values(values: Vec<Value>) -> Result<Self> {
        let mut fields = FieldReader::new(Self::schema(), values)?;
        Ok(Self {
            song_id: fields.next()?,
            title: fields.next()?,
            artist_id: fields.next()?,
            year: fields.next()?,
            duration: fields.next()?,
        })
    }
}

impl TableRow for ArtistRow {
    fn schema() -> Schema {
        ARTISTS_SCHEMA
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Utf8(self.artist_id.clone()),
            Value::Utf8(self.name.clone()),
            self.location.clone().into(),
            self.latitude.into(),
            self.longitude.into(),
        ]
    }

    fn from_values(values: Vec<Value>) -> Result<Self> {
        let mut fields = FieldReader::new(Self::schema(), values)?;
        Ok(Self {
            artist_id: fields.next()?,
            name: fields.next()?,
            location: fields.next()?,
            latitude: fields.next()?,
            longitude: fields.next()?,
        })
    }
}

impl TableRow for UserRow {
    fn schema() -> Schema {
        USERS_SCHEMA
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.user_id.clone().into(),
            self.first_name.clone().into(),
            self.last_name.clone().into(),
            self.gender.clone().into(),
            self.level.clone().into(),
        ]
    }

    fn from_values(values: Vec<Value>) -> Result<Self> {
        let mut fields = FieldReader::new(Self::schema(), values)?;
        Ok(Self {
            user_id: fields.next()?,
            first_name: fields.next()?,
            last_name: fields.next()?,
            gender: fields.next()?,
            level: fields.next()?,
        })
    }
}

impl TableRow for TimeRow {
    fn schema() -> Schema {
        TIME_SCHEMA
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Timestamp(self.start_time),
            Value::Int32(self.hour),
            Value::Int32(self.day),
            Value::Int32(self.week),
            Value::Int32(self.month),
            Value::Int32(self.year),
            Value::Int32(self.weekday),
        ]
    }

    fn from_values(values: Vec<Value>) -> Result<Self> {
        let mut fields = FieldReader::new(Self::schema(), values)?;
        Ok(Self {
            start_time: fields.next()?,
            hour: fields.next()?,
            day: fields.next()?,
            week: fields.next()?,
            month: fields.next()?,
            year: fields.next()?,
            weekday: fields.next()?,
        })
    }
}

impl TableRow for SongPlayRow {
    fn schema() -> Schema {
        SONGPLAYS_SCHEMA
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Timestamp(self.start_time),
            self.user_id.clone().into(),
            self.level.clone().into(),
            self.song_id.clone().into(),
            self.artist_id.clone().into(),
            Value::Int64(self.session_id),
            self.location.clone().into(),
            self.user_agent.clone().into(),
            Value::Int32(self.year),
            Value::Int32(self.month),
        ]
    }

    fn from_values(values: Vec<Value>) -> Result<Self> {
        let mut fields = FieldReader::new(Self::schema(), values)?;
        Ok(Self {
            start_time: fields.next()?,
            user_id: fields.next()?,
            level: fields.next()?,
            song_id: fields.next()?,
            artist_id: fields.next()?,
            session_id: fields.next()?,
            location: fields.next()?,
            user_agent: fields.next()?,
            year: fields.next()?,
            month: fields.next()?,
        })
    }
}
