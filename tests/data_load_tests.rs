use glam::{Mat4, Vec3};
use point_scene::camera::ProjectionMode;
use point_scene::config::SceneConfig;
use point_scene::core::{AssetLoader, RecordingDevice};
use point_scene::input::{decode, Key, KeyPress};
use point_scene::scene::SceneController;
use point_scene::traits::{PrimitiveKind, SceneEvent};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

#[cfg(test)]
mod data_load_tests {
    use super::*;

    fn write_points(name: &str, text: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_load_command_round_trip_through_channel() {
        let path = write_points("point_scene_data_load.txt", "0 0 0\n4 0 0\n0 2 0\n");
        let (tx, rx) = mpsc::channel();
        let mut scene = SceneController::new(RecordingDevice::new(), &SceneConfig::default())
            .with_loader(AssetLoader::new(Box::new(tx)))
            .with_data_path(Some(path.clone()));

        let commands = decode(KeyPress::new(Key::L), &scene.state().steps);
        let mut needs_render = false;
        for command in commands {
            needs_render |= scene.execute(command);
        }
        assert!(!needs_render);

        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(event, SceneEvent::DataLoaded(Ok(_))));
        assert!(scene.handle_event(event));

        let frame = scene.render().unwrap();
        assert_eq!(frame.models, 3);
        assert_eq!(scene.device().draws_of(PrimitiveKind::Triangles), 3);

        let camera = &scene.state().camera;
        assert_eq!(camera.mode(), ProjectionMode::Orthographic);
        assert_eq!(camera.lrtb, 4.0);
        let mean = Vec3::new(4.0 / 3.0, 2.0 / 3.0, 0.0);
        assert!(camera.view.abs_diff_eq(Mat4::from_translation(-mean), 1e-6));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_bad_file_keeps_previous_models() {
        let good = write_points("point_scene_good.txt", "1 1 1\n2 2 2\n");
        let bad = write_points("point_scene_bad.txt", "1 1\n");

        let (tx, rx) = mpsc::channel();
        let loader = AssetLoader::new(Box::new(tx));
        let mut scene = SceneController::new(RecordingDevice::new(), &SceneConfig::default());

        loader.load_data(good.clone());
        scene.handle_event(rx.recv_timeout(Duration::from_secs(5)).unwrap());
        assert_eq!(scene.state().registry.len(), 2);

        loader.load_data(bad.clone());
        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(&event, SceneEvent::DataLoaded(Err(msg)) if msg.contains("line 1")));
        assert!(!scene.handle_event(event));
        assert_eq!(scene.state().registry.len(), 2);

        std::fs::remove_file(good).ok();
        std::fs::remove_file(bad).ok();
    }
}
