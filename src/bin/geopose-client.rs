//! Demo GeoPose protocol client sending one camera frame for localization

use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use serde::Deserialize;
use tracing::warn;

use geopose::geodesy::geodetic_to_enu;
use geopose::protocol::{
    encode_response, redacted_request_json, CameraModel, CameraParameters, CameraReading,
    GeoPoseRequest, GeolocationReading, ImageFormat, ImageOrientation, Reading, Sensor,
    SensorReading, SensorType,
};
use geopose::transport::GeoPoseClient;

const GEOLOCATION_SENSOR_ID: &str = "gps0";

/// JPEG quality used when compressing the query frame.
const JPEG_QUALITY: u8 = 95;

/// Send one localization request with a query image and a coarse position fix.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the GeoPose endpoint.
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Path to the query image.
    #[arg(long)]
    image: PathBuf,

    /// Path to the camera intrinsics JSON file.
    #[arg(long)]
    camera: PathBuf,

    /// Path to the coarse geolocation JSON file.
    #[arg(long)]
    geolocation: PathBuf,
}

/// Camera intrinsics file, e.g.
/// {"camera_id": "0", "camera_model": "PINHOLE", "camera_params": [fx, fy, cx, cy]}
#[derive(Debug, Deserialize)]
struct CameraConfig {
    camera_id: String,
    camera_model: String,
    camera_params: Vec<f32>,
}

/// Coarse fix file, e.g. {"lat": 47.4979, "lon": 19.0402, "h": 120.0}
#[derive(Debug, Deserialize)]
struct CoarseFix {
    lat: f64,
    lon: f64,
    h: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let decoded = image::open(&cli.image)
        .with_context(|| format!("cannot open image {}", cli.image.display()))?;
    // Compress the query frame to JPEG regardless of the input format
    let frame_pixels = decoded.into_rgb8();
    let (width, height) = (frame_pixels.width(), frame_pixels.height());
    let mut jpeg_bytes = Vec::new();
    frame_pixels
        .write_to(
            &mut Cursor::new(&mut jpeg_bytes),
            image::ImageOutputFormat::Jpeg(JPEG_QUALITY),
        )
        .context("cannot compress image to JPEG")?;

    let camera_text = fs::read_to_string(&cli.camera)
        .with_context(|| format!("cannot read camera config {}", cli.camera.display()))?;
    let camera: CameraConfig = serde_json::from_str(&camera_text)
        .with_context(|| format!("cannot parse camera config {}", cli.camera.display()))?;
    let model = CameraModel::from_wire(&camera.camera_model)?;
    if let Some(expected) = model.param_count() {
        if camera.camera_params.len() != expected {
            warn!(
                "camera model {} expects {} parameters, got {}",
                camera.camera_model,
                expected,
                camera.camera_params.len()
            );
        }
    }

    let fix_text = fs::read_to_string(&cli.geolocation)
        .with_context(|| format!("cannot read geolocation {}", cli.geolocation.display()))?;
    let fix: CoarseFix = serde_json::from_str(&fix_text)
        .with_context(|| format!("cannot parse geolocation {}", cli.geolocation.display()))?;

    let frame = CameraReading {
        sequence_number: 0,
        image_format: ImageFormat::Jpg,
        size: [width, height],
        image_bytes: jpeg_bytes,
        image_orientation: Some(ImageOrientation::default()),
        params: Some(CameraParameters {
            model,
            model_params: camera.camera_params,
            ..Default::default()
        }),
    };
    let coarse = GeolocationReading {
        latitude: fix.lat,
        longitude: fix.lon,
        altitude: Some(fix.h),
        accuracy: None,
        altitude_accuracy: None,
        heading: None,
        speed: None,
    };

    let request = GeoPoseRequest::new()
        .with_sensor(
            Sensor::new(SensorType::Camera, camera.camera_id.as_str()).with_name("geopose-client"),
        )
        .with_sensor(Sensor::new(SensorType::Geolocation, GEOLOCATION_SENSOR_ID))
        .with_reading(SensorReading::new(
            camera.camera_id.as_str(),
            Reading::Camera(frame),
        ))
        .with_reading(SensorReading::new(
            GEOLOCATION_SENSOR_ID,
            Reading::Geolocation(coarse),
        ));

    println!("Request (image redacted):");
    println!("{}", redacted_request_json(&request));

    let client = GeoPoseClient::new(cli.url);
    let response = client.localize(&request).await?;

    println!("Response:");
    println!("{}", encode_response(&response)?);

    let position = response.geopose.position;
    println!(
        "Estimated pose: lat {:.8} lon {:.8} h {:.3}",
        position.lat, position.lon, position.h
    );
    let (east, north, up) =
        geodetic_to_enu(position.lat, position.lon, position.h, fix.lat, fix.lon, fix.h);
    println!("Offset from coarse fix: east {east:.3} m, north {north:.3} m, up {up:.3} m");
    Ok(())
}
