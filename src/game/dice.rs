use rand::{rngs::StdRng, Rng, SeedableRng};

/// Lowest face of the die
pub const MIN_FACE: u8 = 1;
/// Highest face of the die
pub const MAX_FACE: u8 = 6;

/// Source of dice rolls for a game.
#[derive(Debug, Clone)]
pub enum Dice {
    /// Uniform rolls from a pseudo-random generator
    Random(StdRng),
    /// Replays a fixed sequence of faces, cycling when it runs out
    Loaded { faces: Vec<u8>, next: usize },
}

impl Default for Dice {
    fn default() -> Self {
        Self::random()
    }
}

impl Dice {
    /// Fair die seeded from the operating system
    pub fn random() -> Self {
        Dice::Random(StdRng::from_os_rng())
    }

    /// Fair die with a reproducible sequence
    pub fn seeded(seed: u64) -> Self {
        Dice::Random(StdRng::seed_from_u64(seed))
    }

    /// Die that rolls the given faces in order. Faces are clamped to 1..=6 and
    /// an empty sequence always rolls 1.
    pub fn loaded(faces: impl IntoIterator<Item = u8>) -> Self {
        Dice::Loaded {
            faces: faces
                .into_iter()
                .map(|face| face.clamp(MIN_FACE, MAX_FACE))
                .collect(),
            next: 0,
        }
    }

    pub fn roll(&mut self) -> u8 {
        match self {
            Dice::Random(rng) => rng.random_range(MIN_FACE..=MAX_FACE),
            Dice::Loaded { faces, next } => {
                let face = faces.get(*next).copied().unwrap_or(MIN_FACE);
                *next = (*next + 1) % faces.len().max(1);
                face
            }
        }
    }
}
