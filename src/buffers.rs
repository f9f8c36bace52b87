use glam::Vec3A;

// every vec3 is followed by 4 bytes of padding so that it has the 16 byte
// stride of a simd float3 on the producer side

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Camera {
    pub position: [f32; 3], // vec3, aligned to 12 bytes
    pub _padding: [u8; 4],  // padding to ensure 16-byte alignment
    pub right: [f32; 3],    // vec3, aligned to 12 bytes
    pub _padding2: [u8; 4], // padding to ensure 16-byte alignment
    pub up: [f32; 3],       // vec3, aligned to 12 bytes
    pub _padding3: [u8; 4], // padding to ensure 16-byte alignment
    pub forward: [f32; 3],  // vec3, aligned to 12 bytes
    pub _padding4: [u8; 4], // padding to ensure 16-byte alignment
}

impl Camera {
    pub fn new(position: Vec3A, right: Vec3A, up: Vec3A, forward: Vec3A) -> Camera {
        Camera {
            position: position.into(),
            _padding: [0; 4],
            right: right.into(),
            _padding2: [0; 4],
            up: up.into(),
            _padding3: [0; 4],
            forward: forward.into(),
            _padding4: [0; 4],
        }
    }

    pub fn position(&self) -> Vec3A {
        self.position.into()
    }

    pub fn right(&self) -> Vec3A {
        self.right.into()
    }

    pub fn up(&self) -> Vec3A {
        self.up.into()
    }

    pub fn forward(&self) -> Vec3A {
        self.forward.into()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AreaLight {
    pub position: [f32; 3], // vec3, aligned to 12 bytes
    pub _padding: [u8; 4],  // padding to ensure 16-byte alignment
    pub forward: [f32; 3],  // vec3, aligned to 12 bytes
    pub _padding2: [u8; 4], // padding to ensure 16-byte alignment
    pub right: [f32; 3],    // vec3, aligned to 12 bytes
    pub _padding3: [u8; 4], // padding to ensure 16-byte alignment
    pub up: [f32; 3],       // vec3, aligned to 12 bytes
    pub _padding4: [u8; 4], // padding to ensure 16-byte alignment
    pub color: [f32; 3],    // vec3, aligned to 12 bytes
    pub _padding5: [u8; 4], // padding to ensure 16-byte alignment
}

impl AreaLight {
    pub fn new(
        position: Vec3A,
        forward: Vec3A,
        right: Vec3A,
        up: Vec3A,
        color: Vec3A,
    ) -> AreaLight {
        AreaLight {
            position: position.into(),
            _padding: [0; 4],
            forward: forward.into(),
            _padding2: [0; 4],
            right: right.into(),
            _padding3: [0; 4],
            up: up.into(),
            _padding4: [0; 4],
            color: color.into(),
            _padding5: [0; 4],
        }
    }

    pub fn position(&self) -> Vec3A {
        self.position.into()
    }

    pub fn forward(&self) -> Vec3A {
        self.forward.into()
    }

    pub fn right(&self) -> Vec3A {
        self.right.into()
    }

    pub fn up(&self) -> Vec3A {
        self.up.into()
    }

    pub fn color(&self) -> Vec3A {
        self.color.into()
    }

    /// Full quad area, `right` and `up` being half extents.
    pub fn area(&self) -> f32 {
        4.0 * self.right().length() * self.up().length()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Uniforms {
    pub width: u32,       // u32, aligned to 4 bytes
    pub height: u32,      // u32, aligned to 4 bytes
    pub blocks_wide: u32, // u32, aligned to 4 bytes
    pub frame_index: u32, // u32, aligned to 4 bytes
    pub camera: Camera,
    pub light: AreaLight,
}

impl Uniforms {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
