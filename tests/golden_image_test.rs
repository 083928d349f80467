#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_clear_colour() {
    use crate::common::test_utils::{TestRender, expected_pixel};
    use rocket_folio::flow::ImageTestResult;
    use wgpu::Color;

    golden_image_test!(|_| TestRender::new(
        None,
        |ctx| ctx.clear_colour = Color::WHITE,
        |_, state, texture| {
            if state.frame() == 0 {
                return Ok(ImageTestResult::Waiting);
            }
            let desired_pixel = expected_pixel(Color::WHITE);
            for pixel in texture.pixels() {
                assert_eq!(*pixel, desired_pixel);
            }
            Ok(ImageTestResult::Passed)
        },
    ));
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_cover_the_centre_with_a_mesh() {
    use crate::common::test_utils::{TestRender, expected_pixel};
    use rocket_folio::{
        data_structures::{
            instance::Instance,
            mesh::{Geometry, Mesh},
            scene_graph::{MeshNode, SceneNode},
        },
        flow::ImageTestResult,
    };
    use wgpu::Color;

    golden_image_test!(|init: rocket_folio::context::InitContext| {
        let mut node = MeshNode::new(
            &init.device,
            Mesh::upload(&init.device, "cube", &Geometry::cuboid(4.0, 4.0, 4.0)),
            1,
        );
        node.set_local_transform(0, Instance::new().with_rgb([1.0, 1.0, 1.0]));
        TestRender::new(
            Some(Box::new(node)),
            |ctx| {
                ctx.clear_colour = Color::BLACK;
                ctx.set_camera((0.0, 0.0, 10.0).into(), (0.0, 0.0, 0.0).into());
            },
            |_, state, texture| {
                if state.frame() == 0 {
                    return Ok(ImageTestResult::Waiting);
                }
                let centre = texture.get_pixel(texture.width() / 2, texture.height() / 2);
                assert_ne!(*centre, expected_pixel(Color::BLACK));
                let corner = texture.get_pixel(0, 0);
                assert_eq!(*corner, expected_pixel(Color::BLACK));
                Ok(ImageTestResult::Passed)
            },
        )
    });
}
