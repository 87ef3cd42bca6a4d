//! A2S_INFO response decoding.

use crate::error::{QueryError, QueryResult};
use crate::packet::{INFO_RESPONSE, Reader};

/// App id of The Ship, which inserts three extra bytes before `version`.
const THE_SHIP_APP_ID: u16 = 2400;

const EDF_PORT: u8 = 0x80;
const EDF_STEAM_ID: u8 = 0x10;
const EDF_SOURCE_TV: u8 = 0x40;
const EDF_KEYWORDS: u8 = 0x20;
const EDF_GAME_ID: u8 = 0x01;

/// Kind of server reported in an info response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerType {
    Dedicated,
    NonDedicated,
    SourceTv,
    Unknown(u8),
}

impl From<u8> for ServerType {
    fn from(b: u8) -> Self {
        match b {
            b'd' | b'D' => Self::Dedicated,
            b'l' | b'L' => Self::NonDedicated,
            b'p' | b'P' => Self::SourceTv,
            other => Self::Unknown(other),
        }
    }
}

/// Operating system the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Linux,
    Windows,
    Mac,
    Unknown(u8),
}

impl From<u8> for Environment {
    fn from(b: u8) -> Self {
        match b {
            b'l' | b'L' => Self::Linux,
            b'w' | b'W' => Self::Windows,
            b'm' | b'M' | b'o' | b'O' => Self::Mac,
            other => Self::Unknown(other),
        }
    }
}

/// Optional trailing fields announced by the extra data flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraData {
    pub port: Option<u16>,
    pub steam_id: Option<u64>,
    pub source_tv: Option<(u16, String)>,
    pub keywords: Option<String>,
    pub game_id: Option<u64>,
}

/// Decoded A2S_INFO response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub protocol: u8,
    pub name: String,
    pub map: String,
    pub folder: String,
    pub game: String,
    pub app_id: u16,
    pub players: u8,
    pub max_players: u8,
    pub bots: u8,
    pub server_type: ServerType,
    pub environment: Environment,
    /// `true` when the server requires a password.
    pub visibility: bool,
    /// `true` when Valve Anti-Cheat is enabled.
    pub vac: bool,
    pub version: String,
    pub extra: ExtraData,
}

impl ServerInfo {
    /// Decode a single-packet message body (framing header already stripped).
    pub fn parse(body: &[u8]) -> QueryResult<Self> {
        let mut r = Reader::new(body);

        let header = r.u8("response type")?;
        if header != INFO_RESPONSE {
            return Err(QueryError::UnexpectedHeader(header));
        }

        let protocol = r.u8("protocol")?;
        let name = r.string("name")?;
        let map = r.string("map")?;
        let folder = r.string("folder")?;
        let game = r.string("game")?;
        let app_id = r.u16("app id")?;
        let players = r.u8("players")?;
        let max_players = r.u8("max players")?;
        let bots = r.u8("bots")?;
        let server_type = ServerType::from(r.u8("server type")?);
        let environment = Environment::from(r.u8("environment")?);
        let visibility = r.u8("visibility")? != 0;
        let vac = r.u8("vac")? != 0;

        if app_id == THE_SHIP_APP_ID {
            // mode, witnesses, duration
            for field in ["ship mode", "ship witnesses", "ship duration"] {
                r.u8(field)?;
            }
        }

        let version = r.string("version")?;
        let extra = if r.has_remaining() {
            parse_extra(&mut r)?
        } else {
            ExtraData::default()
        };

        Ok(Self {
            protocol,
            name,
            map,
            folder,
            game,
            app_id,
            players,
            max_players,
            bots,
            server_type,
            environment,
            visibility,
            vac,
            version,
            extra,
        })
    }
}

fn parse_extra(r: &mut Reader<'_>) -> QueryResult<ExtraData> {
    let edf = r.u8("extra data flag")?;
    let mut extra = ExtraData::default();

    if edf & EDF_PORT != 0 {
        extra.port = Some(r.u16("edf port")?);
    }
    if edf & EDF_STEAM_ID != 0 {
        extra.steam_id = Some(r.u64("edf steam id")?);
    }
    if edf & EDF_SOURCE_TV != 0 {
        let port = r.u16("edf sourcetv port")?;
        let name = r.string("edf sourcetv name")?;
        extra.source_tv = Some((port, name));
    }
    if edf & EDF_KEYWORDS != 0 {
        extra.keywords = Some(r.string("edf keywords")?);
    }
    if edf & EDF_GAME_ID != 0 {
        extra.game_id = Some(r.u64("edf game id")?);
    }

    Ok(extra)
}
