//! Built-in uniforms and helper functions.
//!
//! Camera, time and transform nodes read these uniforms; the host is expected
//! to keep them up to date every frame.

pub const CAMERA_POSITION: &str = "u_cameraPos";
pub const CAMERA_FORWARD: &str = "u_cameraForward";
pub const CAMERA_UP: &str = "u_cameraUp";
pub const CAMERA_SIDE: &str = "u_cameraSide";
pub const Z_NEAR: &str = "u_zNear";
pub const Z_FAR: &str = "u_zFar";
pub const ELAPSED_TIME: &str = "u_elapsedTime";

pub const WORLD_MATRIX: &str = "u_world";
pub const VIEW_MATRIX: &str = "u_view";
pub const PROJ_MATRIX: &str = "u_proj";
pub const VIEW_PROJ_MATRIX: &str = "u_viewProj";
pub const WVP_MATRIX: &str = "u_wvp";

/// A GLSL function emitted once per stage, ahead of `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HelperFunction {
    pub name: &'static str,
    pub source: &'static str,
}

/// Quaternion rotation of a point around an arbitrary axis.
pub const ROTATE_AROUND_AXIS: HelperFunction = HelperFunction {
    name: "rotateAroundAxis",
    source: "\
vec3 rotateAroundAxis(vec3 p, vec3 axis, float angle)
{
    vec3 a = normalize(axis);
    float halfAngle = 0.5 * angle;
    vec4 q = vec4(a * sin(halfAngle), cos(halfAngle));
    return p + 2.0 * cross(q.xyz, cross(q.xyz, p) + q.w * p);
}",
};
