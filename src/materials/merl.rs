// Copyright @yucwang 2026

use std::fmt;
use std::fs::File;
use std::io::{ BufReader, Read };
use std::path::Path;

use crate::core::intersection::Intersection;
use crate::core::rng::LcgRng;
use crate::math::constants::{ Float, PI, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::warp::{ local_to_world, orthonormal_basis, sample_uniform_hemisphere };

use super::russian_roulette;

const RES_THETA_HALF: usize = 90;
const RES_THETA_DIFF: usize = 90;
const RES_PHI_DIFF: usize = 180;
const TABLE_SIZE: usize = RES_THETA_HALF * RES_THETA_DIFF * RES_PHI_DIFF;

const RED_SCALE: Float = 1.0 / 1500.0;
const GREEN_SCALE: Float = 1.15 / 1500.0;
const BLUE_SCALE: Float = 1.66 / 1500.0;

#[derive(Debug)]
pub enum MerlLoadError {
    Io(std::io::Error),
    Malformed(String),
}

impl fmt::Display for MerlLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MerlLoadError::Io(err) => write!(f, "failed to read MERL file: {}", err),
            MerlLoadError::Malformed(reason) => write!(f, "malformed MERL file: {}", reason),
        }
    }
}

impl std::error::Error for MerlLoadError {}

impl From<std::io::Error> for MerlLoadError {
    fn from(err: std::io::Error) -> Self {
        MerlLoadError::Io(err)
    }
}

/// Measured isotropic BRDF in the MERL 100 binary format: a dense table
/// over the Rusinkiewicz half/difference angles, three colour planes of
/// 90 x 90 x 180 doubles.
pub struct Merl {
    table: Vec<f64>,
}

impl Merl {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MerlLoadError> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);

        let mut dims = [0i32; 3];
        for dim in dims.iter_mut() {
            let mut buf = [0u8; 4];
            reader.read_exact(&mut buf)?;
            *dim = i32::from_le_bytes(buf);
        }

        let expected = TABLE_SIZE as i64;
        let product = dims.iter().map(|&d| d as i64).product::<i64>();
        if product != expected {
            return Err(MerlLoadError::Malformed(
                format!("dimensions {:?} do not describe {} samples", dims, expected)));
        }

        let mut table = Vec::with_capacity(TABLE_SIZE * 3);
        let mut buf = [0u8; 8];
        for _ in 0..TABLE_SIZE * 3 {
            reader.read_exact(&mut buf)?;
            table.push(f64::from_le_bytes(buf));
        }

        log::info!("loaded MERL BRDF from {}", path.as_ref().display());
        Ok(Self { table })
    }

    /// Build directly from a sample table, mainly for tests.
    pub fn from_table(table: Vec<f64>) -> Result<Self, MerlLoadError> {
        if table.len() != TABLE_SIZE * 3 {
            return Err(MerlLoadError::Malformed(
                format!("table holds {} samples, expected {}", table.len(), TABLE_SIZE * 3)));
        }
        Ok(Self { table })
    }

    /// Evaluate the BRDF for incoming/outgoing directions given in the
    /// local shading frame (normal along +z).
    pub fn eval_local(&self, wi: &Vector3f, wo: &Vector3f) -> Vector3f {
        let half = wi + wo;
        if half.norm() < 1e-6 {
            return Vector3f::zeros();
        }
        let half = half.normalize();

        let theta_half = half.z.min(1.0).max(-1.0).acos();
        let phi_half = half.y.atan2(half.x);

        // express wi relative to the half vector (Rusinkiewicz difference
        // angles): undo the half vector's azimuth, then its inclination
        let diff = rotate_y(&rotate_z(wi, -phi_half), -theta_half);
        let theta_diff = diff.z.min(1.0).max(-1.0).acos();
        let mut phi_diff = diff.y.atan2(diff.x);
        if phi_diff < 0.0 {
            phi_diff += PI;
        }

        // theta_half is indexed on a square-root scale to put more
        // resolution near the specular peak
        let idx_th = ((theta_half / (PI / 2.0)).max(0.0).sqrt()
                      * RES_THETA_HALF as Float) as usize;
        let idx_th = idx_th.min(RES_THETA_HALF - 1);
        let idx_td = ((theta_diff / (PI / 2.0)) * RES_THETA_DIFF as Float) as usize;
        let idx_td = idx_td.min(RES_THETA_DIFF - 1);
        let idx_pd = ((phi_diff / PI) * RES_PHI_DIFF as Float) as usize;
        let idx_pd = idx_pd.min(RES_PHI_DIFF - 1);

        let idx = idx_pd + RES_PHI_DIFF * (idx_td + RES_THETA_DIFF * idx_th);

        // negative table entries mark unmeasured configurations
        let red = self.table[idx].max(0.0) as Float * RED_SCALE;
        let green = self.table[idx + TABLE_SIZE].max(0.0) as Float * GREEN_SCALE;
        let blue = self.table[idx + 2 * TABLE_SIZE].max(0.0) as Float * BLUE_SCALE;
        Vector3f::new(red, green, blue)
    }

    pub fn sample(&self, isect: &Intersection, ray: &mut Ray3f,
                  rng: &mut LcgRng) -> bool {
        let v = -ray.dir();
        let mut n = isect.n;
        if n.dot(&v) < 0.0 {
            n = -n;
        }

        let (t, b) = orthonormal_basis(&n);
        let wi_local = sample_uniform_hemisphere(&rng.next_2d());
        let wo_local = Vector3f::new(v.dot(&t), v.dot(&b), v.dot(&n));

        let brdf = self.eval_local(&wi_local, &wo_local);
        // uniform hemisphere pdf is 1 / 2pi
        let multiplier = brdf * (wi_local.z * 2.0 * PI);

        // measured tables can spike near the specular ridge; drop the
        // sample rather than carry a firefly
        if multiplier.iter().any(|c| !c.is_finite() || *c >= 100.0) {
            return false;
        }

        let scale = match russian_roulette(&multiplier, rng) {
            Some(scale) => scale,
            None => return false,
        };

        ray.set_dir(local_to_world(&wi_local, &t, &b, &n));
        ray.weight = (multiplier * scale).component_mul(&ray.weight);
        true
    }
}

fn rotate_z(v: &Vector3f, angle: Float) -> Vector3f {
    let (sin_a, cos_a) = angle.sin_cos();
    Vector3f::new(cos_a * v.x - sin_a * v.y,
                  sin_a * v.x + cos_a * v.y,
                  v.z)
}

fn rotate_y(v: &Vector3f, angle: Float) -> Vector3f {
    let (sin_a, cos_a) = angle.sin_cos();
    Vector3f::new(cos_a * v.x + sin_a * v.z,
                  v.y,
                  -sin_a * v.x + cos_a * v.z)
}
