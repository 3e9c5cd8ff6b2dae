#![allow(dead_code)]

use oz_weather_core::{Fetch, LoadError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;

pub fn init_logging() {
    let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, simplelog::Config::default());
}

pub fn last_updated() -> Value {
    json!({ "lastUpdated": "2025-02-03T14:05:11.482913+11:00" })
}

/// One body per path of the Melbourne page, loosely shaped like the scraper output.
pub fn melbourne_assets() -> Vec<(&'static str, Value)> {
    vec![
        (
            "/historic_temp.json",
            json!([{ "Year": 1855, "Month": 3, "Day": 1, "Maximum temperature (Degree C)": 24.0 }]),
        ),
        (
            "/historic_rain.json",
            json!([{ "Year": 1855, "Month": 3, "Day": 1, "Rainfall amount (millimetres)": 0.0 }]),
        ),
        (
            "/observations.json",
            json!([{ "date": "2025-02-03", "max_temp": 31.2, "min_temp": 17.9, "rain": 0.0 }]),
        ),
        (
            "/forecasts.json",
            json!([{ "date": "2025-02-04", "hour": 14, "temp": 29 }]),
        ),
        (
            "/climate.json",
            json!([{ "month": "January", "mean_max": 25.9 }]),
        ),
        ("/last_updated.json", last_updated()),
        (
            "/climate_stats.json",
            json!([{ "Category": "Temperature", "Metric": "Mean_Max_Temp", "January": 25.9 }]),
        ),
        ("/last30.json", json!([{ "date": "2025-01-05", "max_temp": 22.4 }])),
    ]
}

pub fn city_detail(city: &str) -> Value {
    json!({
        "temperature_2m": [{ "time": "2025-02-03T14:00:00+11:00", "value": 28.4 }],
        "temperature_2m_avg": [{ "hour": 14, "value": 24.1 }],
        "city": city,
    })
}

/// Serves JSON bodies from memory and remembers every path requested.
#[derive(Default)]
pub struct MemoryFetcher {
    bodies: HashMap<String, Vec<u8>>,
    failing: Vec<String>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn melbourne() -> Self {
        let mut fetcher = Self::new();
        for (path, body) in melbourne_assets() {
            fetcher = fetcher.with_json(path, body);
        }
        fetcher
    }

    pub fn cities(names: &[&str]) -> Self {
        let mut fetcher = Self::new().with_json("/cities/_list.json", json!(names));
        for name in names {
            fetcher = fetcher.with_json(&format!("/cities/{}.json", name), city_detail(name));
        }
        fetcher
    }

    pub fn with_json(self, path: &str, body: Value) -> Self {
        self.with_raw(path, body.to_string().as_bytes())
    }

    pub fn with_raw(mut self, path: &str, body: &[u8]) -> Self {
        self.bodies.insert(path.to_string(), body.to_vec());
        self
    }

    /// Answers `path` with a 500.
    pub fn failing(mut self, path: &str) -> Self {
        self.failing.push(path.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        let mut requests = self.requests.lock().unwrap().clone();
        requests.sort();
        requests
    }
}

impl Fetch for MemoryFetcher {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, LoadError> {
        self.requests.lock().unwrap().push(path.to_string());
        if self.failing.iter().any(|p| p == path) {
            return Err(LoadError::Status {
                path: path.to_string(),
                status: 500,
            });
        }
        self.bodies.get(path).cloned().ok_or_else(|| LoadError::Status {
            path: path.to_string(),
            status: 404,
        })
    }
}

/// A static build directory on disk.
pub struct MockSite {
    // Keep TempDir alive so the directory isn't deleted
    _dir: TempDir,
    pub root: PathBuf,
}

impl MockSite {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path().join("build");
        fs::create_dir_all(root.join("cities")).unwrap();
        Self { _dir: dir, root }
    }

    pub fn write_json(&self, path: &str, body: &Value) {
        self.write_raw(path, body.to_string().as_bytes());
    }

    pub fn write_raw(&self, path: &str, body: &[u8]) {
        let file = self.root.join(path.trim_start_matches('/'));
        fs::write(file, body).unwrap();
    }
}

/// A local HTTP server answering from a fixed set of JSON bodies; anything
/// else gets a 404.
pub struct HttpSite {
    pub origin: String,
}

impl HttpSite {
    pub fn serve(base_path: &str, bodies: Vec<(&'static str, Value)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());
        let routes: HashMap<String, String> = bodies
            .into_iter()
            .map(|(path, body)| (format!("{}{}", base_path, path), body.to_string()))
            .collect();
        let routes = Arc::new(routes);

        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                thread::spawn(move || answer(stream, &routes));
            }
        });
        Self { origin }
    }
}

fn answer(mut stream: TcpStream, routes: &HashMap<String, String>) {
    let response = match routes.get(&request_path(&mut stream)) {
        Some(body) => format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ),
        None => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            .to_string(),
    };
    let _ = stream.write_all(response.as_bytes());
}

fn request_path(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf)
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string()
}

/// Accepts connections into the backlog and never answers.
pub struct StalledSite {
    _listener: TcpListener,
    pub origin: String,
}

impl StalledSite {
    pub fn new() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());
        Self {
            _listener: listener,
            origin,
        }
    }
}
