//! Command-line front end: preview a packed model or build a map region.

mod config;
mod framebuffer;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use umbra_cache::{ChannelProvider, ModelCache};
use umbra_defs::DefsRegistry;
use umbra_geom::{cos, sin};
use umbra_model::Model;
use umbra_raster::{Palette, Rasterizer, Viewport};
use umbra_world::{CollisionGrid, LocContext, REGION_SIZE, Scene, World};

use config::AppConfig;
use framebuffer::Framebuffer;

/// Polls allowed while waiting for loc models to arrive.
const READY_POLLS: usize = 200;

#[derive(Parser)]
#[command(name = "umbra")]
#[command(about = "Software world construction and rasterization", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file
    #[arg(long, default_value = "umbra.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode, light and draw one model blob to an image (format from the extension)
    RenderModel {
        /// Packed model file
        model: PathBuf,

        /// Output image path
        #[arg(short, long, default_value = "model.png")]
        output: PathBuf,

        /// Eye pitch in 2048-step units
        #[arg(long, default_value = "128")]
        pitch: i32,

        /// Model yaw in 2048-step units
        #[arg(long, default_value = "0")]
        yaw: i32,

        /// Eye distance; derived from the model bounds when unset
        #[arg(long)]
        zoom: Option<i32>,
    },

    /// Load a mapsquare's ground and loc streams, build it and report counts
    BuildRegion {
        /// Terrain stream file
        ground: PathBuf,

        /// Loc stream file
        #[arg(long)]
        locs: Option<PathBuf>,

        /// World tile coordinates of the region's south-west corner
        #[arg(long, default_value = "3200")]
        origin_x: i32,

        #[arg(long, default_value = "3200")]
        origin_z: i32,

        /// Tile offset of the mapsquare within the region
        #[arg(long, default_value = "0")]
        x_off: i32,

        #[arg(long, default_value = "0")]
        z_off: i32,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    match cli.command {
        Commands::RenderModel {
            model,
            output,
            pitch,
            yaw,
            zoom,
        } => render_model(&config, &model, &output, pitch, yaw, zoom),
        Commands::BuildRegion {
            ground,
            locs,
            origin_x,
            origin_z,
            x_off,
            z_off,
        } => build_region(
            &config,
            &ground,
            locs.as_deref(),
            (origin_x, origin_z),
            (x_off, z_off),
        ),
    }
}

fn render_model(
    config: &AppConfig,
    path: &Path,
    output: &Path,
    pitch: i32,
    yaw: i32,
    zoom: Option<i32>,
) -> Result<(), Box<dyn Error>> {
    let blob = fs::read(path)?;
    let mut model = Model::decode(&blob);
    if model.is_empty() {
        return Err(format!("{} holds no geometry", path.display()).into());
    }
    model.calculate_normals(&config.lighting(), true);
    log::info!(
        "{}: {} vertices, {} faces, radius {}",
        path.display(),
        model.vertex_count(),
        model.face_count(),
        model.bounds.radius
    );

    let vp = &config.viewport;
    let palette = Arc::new(Palette::new(vp.brightness));
    let mut fb = Framebuffer::new(vp.width, vp.height, palette.clone());
    let mut rasterizer = Rasterizer::new(Viewport::new(vp.width, vp.height), palette);

    let zoom = zoom.unwrap_or_else(|| (model.bounds.min_depth * 4).max(100));
    let eye_y = ((sin(pitch) * zoom) >> 16) + model.bounds.max_y / 2;
    let eye_z = (cos(pitch) * zoom) >> 16;
    rasterizer.draw_simple(&model, 0, yaw, 0, pitch, 0, eye_y, eye_z, &mut fb);

    let stats = rasterizer.stats();
    log::info!("drew {} faces, skipped {}", stats.faces, stats.skipped);
    fb.save(output)?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn build_region(
    config: &AppConfig,
    ground: &Path,
    locs: Option<&Path>,
    (origin_x, origin_z): (i32, i32),
    (x_off, z_off): (i32, i32),
) -> Result<(), Box<dyn Error>> {
    let defs = DefsRegistry::load_from_paths(&config.paths.locs, &config.paths.floors)?;
    let mut cache = ModelCache::new(
        ChannelProvider::new(&config.paths.models),
        config.cache_config(),
    );

    let mut world = World::with_options(REGION_SIZE, REGION_SIZE, config.build_options());
    let mut scene = Scene::new(REGION_SIZE, REGION_SIZE);
    let mut collision = CollisionGrid::levels(REGION_SIZE, REGION_SIZE);

    world.load_ground(origin_x, origin_z, x_off, z_off, &fs::read(ground)?)?;

    if let Some(path) = locs {
        let bytes = fs::read(path)?;
        let mut polls = 0;
        while !World::locs_ready(&bytes, &defs, &mut cache)? {
            if polls == READY_POLLS {
                log::warn!("some loc models never arrived; placing without them");
                break;
            }
            thread::sleep(Duration::from_millis(5));
            cache.store.poll();
            polls += 1;
        }
        let mut ctx = LocContext {
            scene: &mut scene,
            collision: &mut collision,
            defs: &defs,
            cache: &mut cache,
        };
        let placed = world.load_locations(&bytes, x_off, z_off, &mut ctx)?;
        log::info!("placed {} locs from {}", placed, path.display());
    }

    let stats = world.build(&mut scene, &mut collision, &defs)?;
    let statics = cache.static_stats();
    println!("ground tiles: {}", stats.ground_tiles);
    println!("locs:         {}", scene.loc_count());
    println!("lit models:   {}", stats.lit_models);
    println!("occluders:    {}", stats.occluders);
    println!("bridges:      {}", stats.bridges);
    println!("model cache:  {} hits, {} misses", statics.hits, statics.misses);
    Ok(())
}
