use rand::Rng;

const BASE_POPULATION: f32 = 100.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub hue: f32,
}

/// Fixed-size particle population bounded by the render surface.
///
/// The population only changes size on [`ParticleField::reset`]; `advance`
/// mutates particles in place and reflects them off the surface edges.
#[derive(Clone, Debug, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f32,
    height: f32,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn population_size(scale: f32) -> usize {
        (BASE_POPULATION * scale).floor().max(0.0) as usize
    }

    pub fn reset<R: Rng + ?Sized>(&mut self, width: f32, height: f32, scale: f32, rng: &mut R) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        let count = Self::population_size(scale);
        self.particles = (0..count)
            .map(|_| Particle {
                x: rng.random_range(0.0..=self.width),
                y: rng.random_range(0.0..=self.height),
                vx: rng.random_range(-1.0..=1.0),
                vy: rng.random_range(-1.0..=1.0),
                size: rng.random_range(1.0..=4.0),
                hue: rng.random_range(0.0..360.0),
            })
            .collect();
    }

    pub fn advance(&mut self, bands: &[f32], sensitivity: f32, thickness: f32) {
        let (width, height) = (self.width, self.height);
        for (index, particle) in self.particles.iter_mut().enumerate() {
            let band = if bands.is_empty() {
                0.0
            } else {
                bands[index % bands.len()]
            };
            let intensity = (band / 255.0) * sensitivity;
            particle.x += particle.vx * (1.0 + intensity);
            particle.y += particle.vy * (1.0 + intensity);
            particle.size = (1.0 + intensity * 5.0) * thickness;

            if particle.x < 0.0 || particle.x > width {
                particle.vx = -particle.vx;
            }
            if particle.y < 0.0 || particle.y > height {
                particle.vy = -particle.vy;
            }
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }
}
