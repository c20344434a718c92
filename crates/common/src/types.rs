use glam::{Mat3, Mat4, Vec3};

/// Derived state of a [`Transform`], rebuilt by [`Transform::recompute`].
#[derive(Debug, Clone, Copy, PartialEq)]
struct Basis {
    matrix: Mat4,
    forward: Vec3,
    up: Vec3,
    right: Vec3,
}

impl Default for Basis {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
            forward: Vec3::Z,
            up: Vec3::Y,
            right: Vec3::X,
        }
    }
}

/// Spatial transform: position, rotation, scale.
///
/// Rotation is stored in degrees per axis and applied X, then Y, then Z.
/// The model matrix and the direction vectors are derived state: they are
/// only valid after [`Transform::recompute`], and every mutation of the
/// public fields must be followed by a recompute before they are read again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    basis: Basis,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            basis: Basis::default(),
        }
    }
}

impl Transform {
    /// Build a transform and derive its matrix immediately.
    pub fn placed(position: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Self {
        let mut t = Self {
            position,
            rotation: rotation_degrees,
            scale,
            basis: Basis::default(),
        };
        t.recompute();
        t
    }

    /// Rebuild the model matrix as
    /// `translate(position) * rotX * rotY * rotZ * scale(scale)`
    /// and re-derive forward/up/right from its basis columns.
    ///
    /// Translation comes first, so rotation happens about the world origin
    /// before the object is moved into place. NaN and infinite inputs are
    /// carried through unchanged.
    pub fn recompute(&mut self) {
        let matrix = Mat4::from_translation(self.position)
            * Mat4::from_rotation_x(self.rotation.x.to_radians())
            * Mat4::from_rotation_y(self.rotation.y.to_radians())
            * Mat4::from_rotation_z(self.rotation.z.to_radians())
            * Mat4::from_scale(self.scale);

        self.basis = Basis {
            matrix,
            forward: matrix.z_axis.truncate(),
            up: matrix.y_axis.truncate(),
            right: matrix.x_axis.truncate(),
        };
    }

    pub fn matrix(&self) -> Mat4 {
        self.basis.matrix
    }

    pub fn forward(&self) -> Vec3 {
        self.basis.forward
    }

    pub fn up(&self) -> Vec3 {
        self.basis.up
    }

    pub fn right(&self) -> Vec3 {
        self.basis.right
    }

    /// Inverse-transpose of the upper 3x3, for transforming normals.
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.basis.matrix).inverse().transpose()
    }
}
