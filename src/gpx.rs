use crate::dlog;
use crate::error::PositionError;
use crate::position::PositionProvider;
use crate::types::Coords;
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use std::fs;
use std::path::Path;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub coords: Coords,
    pub time: Option<DateTime<Utc>>,
    pub ele: Option<f64>,
}

/// Totals derived from a track, used to pre-fill a new workout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSummary {
    pub start: Coords,
    /// Kilometers along the track.
    pub distance: f64,
    /// Minutes between first and last timestamp, if the track has two.
    pub duration: Option<f64>,
    /// Sum of positive elevation steps, in meters.
    pub elevation_gain: f64,
}

#[derive(Debug, Clone, Default)]
pub struct GpxTrack {
    points: Vec<TrackPoint>,
}

impl GpxTrack {
    pub fn from_path(path: &Path) -> Result<Self, PositionError> {
        let bytes = fs::read(path)?;
        let track = Self::parse(&bytes)?;
        tracing::info!(path = %path.display(), points = track.points.len(), "read gpx track");
        Ok(track)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, PositionError> {
        let mut xml = Reader::from_reader(bytes);
        xml.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut st = ParseState::default();
        let mut points = Vec::new();

        loop {
            match xml.read_event_into(&mut buf) {
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => on_start(&mut st, &e),
                Ok(Event::Empty(e)) => {
                    on_start(&mut st, &e);
                    // <trkpt lat=".." lon=".."/> opens and closes in one event
                    if matches!(e.name().as_ref(), b"trkpt" | b"rtept") {
                        on_point_end(&mut st, &mut points);
                    }
                }
                Ok(Event::End(e)) => on_end(&mut st, &e, &mut points),
                Ok(Event::Text(e)) => on_text(&mut st, &e),
                Err(e) => return Err(PositionError::Xml(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn summary(&self) -> Option<TrackSummary> {
        let first = self.points.first()?;

        let distance: f64 = self
            .points
            .windows(2)
            .map(|w| haversine_km(w[0].coords, w[1].coords))
            .sum();

        let elevation_gain: f64 = self
            .points
            .iter()
            .filter_map(|p| p.ele)
            .collect::<Vec<_>>()
            .windows(2)
            .map(|w| (w[1] - w[0]).max(0.0))
            .sum();

        let mut times = self.points.iter().filter_map(|p| p.time);
        let duration = match (times.next(), times.last()) {
            (Some(t0), Some(t1)) if t1 > t0 => {
                #[allow(clippy::cast_precision_loss)]
                let secs = (t1 - t0).num_milliseconds() as f64 / 1000.0;
                Some(secs / 60.0)
            }
            _ => None,
        };

        Some(TrackSummary {
            start: first.coords,
            distance,
            duration,
            elevation_gain,
        })
    }
}

impl PositionProvider for GpxTrack {
    fn current_position(&self) -> Result<Coords, PositionError> {
        self.points
            .first()
            .map(|p| p.coords)
            .ok_or_else(|| PositionError::Unavailable("track has no points".to_string()))
    }
}

pub fn haversine_km(a: Coords, b: Coords) -> f64 {
    let (lat0, lat1) = (a.lat().to_radians(), b.lat().to_radians());
    let dlat = lat1 - lat0;
    let dlng = (b.lng() - a.lng()).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat0.cos() * lat1.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[derive(Default)]
struct ParseState {
    in_trkpt: bool,
    in_time: bool,
    in_ele: bool,

    cur: Option<Coords>,
    cur_time: Option<DateTime<Utc>>,
    cur_ele: Option<f64>,
}

fn on_start(st: &mut ParseState, e: &BytesStart<'_>) {
    match e.name().as_ref() {
        b"trkpt" | b"rtept" => {
            st.in_trkpt = true;
            st.cur = point_coords(e);
            st.cur_time = None;
            st.cur_ele = None;
        }
        b"time" if st.in_trkpt => st.in_time = true,
        b"ele" if st.in_trkpt => st.in_ele = true,
        _ => {}
    }
}

fn on_end(st: &mut ParseState, e: &BytesEnd<'_>, out: &mut Vec<TrackPoint>) {
    match e.name().as_ref() {
        b"time" => st.in_time = false,
        b"ele" => st.in_ele = false,
        b"trkpt" | b"rtept" => on_point_end(st, out),
        _ => {}
    }
}

fn on_point_end(st: &mut ParseState, out: &mut Vec<TrackPoint>) {
    if !st.in_trkpt {
        return;
    }
    st.in_trkpt = false;

    let Some(coords) = st.cur.take() else {
        dlog!("gpx_point_without_coords");
        return;
    };
    out.push(TrackPoint {
        coords,
        time: st.cur_time.take(),
        ele: st.cur_ele.take(),
    });
}

fn on_text(st: &mut ParseState, e: &BytesText<'_>) {
    if st.in_time
        && let Ok(s) = e.decode()
        && let Ok(t) = DateTime::parse_from_rfc3339(s.as_ref())
    {
        st.cur_time = Some(t.with_timezone(&Utc));
    } else if st.in_ele
        && let Ok(s) = e.decode()
        && let Ok(v) = s.trim().parse::<f64>()
    {
        st.cur_ele = Some(v).filter(|v| v.is_finite());
    }
}

fn point_coords(e: &BytesStart<'_>) -> Option<Coords> {
    let mut lat = None;
    let mut lon = None;

    for a in e.attributes().with_checks(false).flatten() {
        let Ok(v) = a.unescape_value() else {
            continue;
        };
        match a.key.as_ref() {
            b"lat" => lat = v.parse::<f64>().ok(),
            b"lon" => lon = v.parse::<f64>().ok(),
            _ => {}
        }
    }

    Coords::new(lat?, lon?).ok()
}
