use crate::math::vec::Vec3;

/// Column-major 4x4 matrix, laid out the way WGSL expects `mat4x4<f32>`.
///
/// `self.0[c][r]` is column `c`, row `r`. [`Mat4::multiply`] is the usual
/// matrix product, so `a.multiply(&b)` applies `b` first.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Mat4(pub [[f32; 4]; 4]);

impl Mat4 {
    /// Right-handed perspective projection with a 0..1 depth range.
    pub fn perspective(
        field_of_view_y_in_radians: f32,
        aspect: f32,
        z_near: f32,
        z_far: f32,
    ) -> Mat4 {
        let f = 1.0 / (field_of_view_y_in_radians * 0.5).tan();
        let range_reciprocal = 1.0 / (z_near - z_far);

        Mat4([
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, z_far * range_reciprocal, -1.0],
            [0.0, 0.0, z_far * z_near * range_reciprocal, 0.0],
        ])
    }

    /// Right-handed view matrix looking from `eye` towards `target`.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let side = forward.cross(&up).normalize();
        let up = side.cross(&forward);

        Mat4([
            [side.x(), up.x(), -forward.x(), 0.0],
            [side.y(), up.y(), -forward.y(), 0.0],
            [side.z(), up.z(), -forward.z(), 0.0],
            [-side.dot(&eye), -up.dot(&eye), forward.dot(&eye), 1.0],
        ])
    }

    pub fn translation(tx: f32, ty: f32, tz: f32) -> Mat4 {
        Mat4([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [tx, ty, tz, 1.0],
        ])
    }

    pub fn scaling(sx: f32, sy: f32, sz: f32) -> Mat4 {
        Mat4([
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotation_y(angle_in_radians: f32) -> Mat4 {
        let (s, c) = angle_in_radians.sin_cos();
        Mat4([
            [c, 0.0, -s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn multiply(&self, b: &Mat4) -> Mat4 {
        let mut result = [[0.0; 4]; 4];
        for (col, column) in result.iter_mut().enumerate() {
            for (row, cell) in column.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.0[k][row] * b.0[col][k]).sum();
            }
        }
        Mat4(result)
    }

    /// Transforms a point (w = 1) and performs the perspective divide.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        let m = &self.0;
        let (x, y, z) = (point.x(), point.y(), point.z());
        let out = |row: usize| m[0][row] * x + m[1][row] * y + m[2][row] * z + m[3][row];
        let w = out(3);
        let w = if w.abs() <= f32::EPSILON { 1.0 } else { w };
        Vec3::new(out(0) / w, out(1) / w, out(2) / w)
    }
}

impl From<[[f32; 4]; 4]> for Mat4 {
    fn from(matrix: [[f32; 4]; 4]) -> Self {
        Mat4(matrix)
    }
}

impl From<Mat4> for [[f32; 4]; 4] {
    fn from(matrix: Mat4) -> Self {
        matrix.0
    }
}
