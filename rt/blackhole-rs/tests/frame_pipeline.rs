use blackhole_rs::camera::{projection_matrix, OrbitCamera};
use blackhole_rs::warp::project_to_uv;
use blackhole_rs::{SceneConfig, SceneRenderer, SoftwareBackend};
use rand::rngs::StdRng;
use rand::SeedableRng;

const WIDTH: u32 = 160;
const HEIGHT: u32 = 120;

fn scene() -> (SceneRenderer<SoftwareBackend>, OrbitCamera) {
    let mut config = SceneConfig::default();
    config.black_hole.resolution = 32;
    let camera = OrbitCamera::new(&config.camera);
    let mut rng = StdRng::seed_from_u64(2024);
    let renderer = SceneRenderer::new(SoftwareBackend::new(WIDTH, HEIGHT), config, &mut rng);
    (renderer, camera)
}

fn hole_pixel(renderer: &SceneRenderer<SoftwareBackend>, camera: &OrbitCamera) -> (u32, u32) {
    let config = renderer.config();
    let view_proj =
        projection_matrix(&config.camera, WIDTH as f32 / HEIGHT as f32) * camera.view_matrix();
    let uv = project_to_uv(view_proj, config.black_hole_position());
    let x = (uv.x * WIDTH as f32) as u32;
    let y = ((1.0 - uv.y) * HEIGHT as f32) as u32;
    (x, y)
}

fn rgba_at(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * WIDTH + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

#[test]
fn test_hole_centre_is_black() {
    let (mut renderer, camera) = scene();
    let diagnostics = renderer.render_frame(&camera);
    assert!((diagnostics.camera_distance - 3.5112).abs() < 1e-3);

    let (x, y) = hole_pixel(&renderer, &camera);
    let pixels = renderer.backend().read_pixels();
    assert_eq!(pixels.len(), (WIDTH * HEIGHT * 4) as usize);
    assert_eq!(rgba_at(&pixels, x, y), [0, 0, 0, 255]);
}

#[test]
fn test_background_and_overlay_are_drawn() {
    let (mut renderer, camera) = scene();
    renderer.render_frame(&camera);
    let pixels = renderer.backend().read_pixels();

    // bottom-right corner sees only the clear colour or grid lines
    let corner = rgba_at(&pixels, WIDTH - 1, HEIGHT - 1);
    assert_eq!(corner[3], 255);
    assert!(corner[0] >= 5);

    // the overlay lives in the top-left corner
    let lit_text = (0..20)
        .flat_map(|y| (0..WIDTH / 2).map(move |x| (x, y)))
        .filter(|&(x, y)| rgba_at(&pixels, x, y)[0] > 200)
        .count();
    assert!(lit_text > 0);
}

#[test]
fn test_frames_are_deterministic_for_a_seed() {
    let (mut a, camera) = scene();
    let (mut b, _) = scene();
    a.render_frame(&camera);
    b.render_frame(&camera);
    assert_eq!(a.backend().read_pixels(), b.backend().read_pixels());
}

#[test]
fn test_star_layer_holds_stars() {
    let (mut renderer, mut camera) = scene();
    // look down -Z, where both stars sit
    camera.azimuth = std::f32::consts::FRAC_PI_2;
    renderer.render_frame(&camera);
    let layer = renderer
        .backend()
        .star_layer()
        .expect("star layer is created with the scene");
    let mut lit = 0;
    for y in 0..layer.height() {
        for x in 0..layer.width() {
            if layer.pixel(x, y).w > 0.0 {
                lit += 1;
            }
        }
    }
    assert!(lit > 0);
}
