use glam::{Mat4, Vec3, Vec4};
use point_scene::config::{ModelSpec, SceneConfig};
use point_scene::core::{DeviceCall, RecordingDevice};
use point_scene::dispatch::WIREFRAME_COLOR;
use point_scene::model::{FillStyle, TextureSlot};
use point_scene::pipeline::compute_transforms;
use point_scene::scene::SceneController;
use point_scene::traits::{GraphicsDevice, PrimitiveKind};

#[cfg(test)]
mod render_cycle_tests {
    use super::*;

    fn scene_with(style: FillStyle, color: [f32; 4]) -> SceneController<RecordingDevice> {
        let mut scene = SceneController::new(RecordingDevice::new(), &SceneConfig::default());
        scene.populate_models(&[ModelSpec {
            fill_style: style,
            color,
            ..ModelSpec::default()
        }]);
        scene
    }

    #[test]
    fn test_fill_model_issues_one_triangle_draw() {
        let mut scene = scene_with(FillStyle::Fill, [1.0, 1.0, 1.0, 1.0]);
        let frame = scene.render().unwrap();

        assert_eq!(frame.draw_calls, 1);
        assert_eq!(scene.device().draws_of(PrimitiveKind::Triangles), 1);
        assert_eq!(scene.device().draws_of(PrimitiveKind::Lines), 0);
    }

    #[test]
    fn test_fill_and_wireframe_line_draw_is_black() {
        let mut scene = scene_with(FillStyle::FillAndWireframe, [0.9, 0.1, 0.3, 1.0]);
        scene.render().unwrap();

        let device = scene.device();
        assert_eq!(device.draws_of(PrimitiveKind::Triangles), 1);
        assert_eq!(device.draws_of(PrimitiveKind::Lines), 1);

        let lines = device
            .draws()
            .iter()
            .find(|d| d.primitive == PrimitiveKind::Lines)
            .unwrap();
        assert_eq!(lines.color, Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(lines.color, WIREFRAME_COLOR);

        let fill = device
            .draws()
            .iter()
            .find(|d| d.primitive == PrimitiveKind::Triangles)
            .unwrap();
        assert_eq!(fill.color, Vec4::new(0.9, 0.1, 0.3, 1.0));
    }

    #[test]
    fn test_default_camera_draw_state() {
        let mut scene = scene_with(FillStyle::Fill, [1.0, 1.0, 1.0, 1.0]);
        scene.render().unwrap();

        let draw = &scene.device().draws()[0];
        assert_eq!(draw.model_view, Mat4::IDENTITY);
        assert_eq!(draw.projection, Mat4::orthographic_rh_gl(-2.0, 2.0, -2.0, 2.0, -2.0, 2.0));
    }

    #[test]
    fn test_each_draw_uses_its_own_model_view() {
        let mut scene = SceneController::new(RecordingDevice::new(), &SceneConfig::default());
        scene.populate_models(&[
            ModelSpec {
                translate: [1.0, 0.0, 0.0],
                ..ModelSpec::default()
            },
            ModelSpec {
                translate: [0.0, 2.0, 0.0],
                scale: [0.5; 3],
                ..ModelSpec::default()
            },
        ]);
        scene.state_mut().camera.translate(Vec3::new(0.0, 0.0, -1.0));
        scene.render().unwrap();

        let state = scene.state();
        let expected: Vec<Mat4> = state.registry.iter().map(|m| m.transforms.model_view).collect();
        assert_ne!(expected[0], expected[1]);

        let device = scene.device();
        let drawn: Vec<Mat4> = device.draws().iter().map(|d| d.model_view).collect();
        assert_eq!(drawn, expected);
        assert_eq!(drawn[0].transform_point3(Vec3::ZERO), Vec3::new(1.0, 0.0, -1.0));
        assert_eq!(drawn[1].transform_point3(Vec3::ZERO), Vec3::new(0.0, 2.0, -1.0));

        // The matrix set most recently before each draw is that model's
        let mut current = None;
        let mut seen = Vec::new();
        for call in device.calls() {
            match call {
                DeviceCall::SetModelView(m) => current = Some(*m),
                DeviceCall::DrawElements { .. } => seen.push(current.unwrap()),
                _ => {}
            }
        }
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_pending_texture_excluded_but_transformed() {
        let mut scene = scene_with(FillStyle::Fill, [1.0, 1.0, 1.0, 1.0]);
        let id = scene.state().registry.id_at(0).unwrap();
        let handle = scene.device_mut().create_texture();
        {
            let state = scene.state_mut();
            let model = state.registry.get_mut(id).unwrap();
            model.translate = Vec3::new(0.5, 0.0, 0.0);
            model.texture = Some(TextureSlot::pending(handle));
        }
        scene.state_mut().camera.translate(Vec3::new(0.0, 1.0, 0.0));

        let frame = scene.render().unwrap();
        assert_eq!(frame.skipped, 1);
        assert!(scene.device().draws().is_empty());

        let state = scene.state();
        let model = state.registry.get(id).unwrap();
        let expected = compute_transforms(model, &state.camera.view);
        assert_eq!(model.transforms, expected);
        assert_eq!(
            model.transforms.model_view.transform_point3(Vec3::ZERO),
            Vec3::new(0.5, 1.0, 0.0)
        );
    }

    #[test]
    fn test_lights_uploaded_in_eye_space() {
        let mut scene = scene_with(FillStyle::Fill, [1.0, 1.0, 1.0, 1.0]);
        scene.state_mut().camera.translate(Vec3::new(1.0, 0.0, 0.0));
        scene.render().unwrap();

        let light = scene
            .device()
            .calls()
            .iter()
            .find_map(|c| match c {
                DeviceCall::SetLight { index: 0, light } => Some(*light),
                _ => None,
            })
            .unwrap();
        assert_eq!(light.position, Vec3::new(-2.0, 1.0, -3.0));
    }
}
