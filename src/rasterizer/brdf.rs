//! Reflectance functions
//!
//! `lambert` and `phong` drive the shading stage. The microfacet terms in
//! [`microfacet`] are not wired into shading; enabling them changes output.

use std::f32::consts::PI;
use super::math::Vec3;
use super::types::ColorRGB;

/// Lambert diffuse: `kd * cd / pi`
pub fn lambert(kd: f32, cd: ColorRGB) -> ColorRGB {
    cd * (kd / PI)
}

/// Phong specular.
///
/// `l` points from the surface toward the light, `v` from the eye toward the
/// surface, `n` is the surface normal.
pub fn phong(ks: f32, exp: f32, l: Vec3, v: Vec3, n: Vec3) -> ColorRGB {
    let reflect = l.reflect(n).normalize();

    let angle = reflect.dot(v);
    if angle < 0.0 {
        return ColorRGB::BLACK;
    }

    ColorRGB::WHITE * (ks * angle.powf(exp))
}

/// Cook-Torrance building blocks
#[allow(dead_code)]
pub mod microfacet {
    use super::*;

    /// Fresnel, Schlick approximation. `h` is the half vector, `f0` the base
    /// reflectivity.
    pub fn fresnel_schlick(h: Vec3, v: Vec3, f0: ColorRGB) -> ColorRGB {
        let d = h.dot(v);
        if d < 0.0 {
            return ColorRGB::BLACK;
        }
        let k = (1.0 - d).powi(5);
        ColorRGB::new(
            f0.r + (1.0 - f0.r) * k,
            f0.g + (1.0 - f0.g) * k,
            f0.b + (1.0 - f0.b) * k,
        )
    }

    /// Trowbridge-Reitz GGX normal distribution, roughness squared
    pub fn normal_distribution_ggx(n: Vec3, h: Vec3, roughness: f32) -> f32 {
        let a = roughness * roughness;
        let a2 = a * a;

        let d = n.dot(h);
        if d < 0.0 {
            return 0.0;
        }

        let denom = d * d * (a2 - 1.0) + 1.0;
        a2 / (PI * denom * denom)
    }

    /// Schlick-GGX geometry term for direct lighting
    pub fn geometry_schlick_ggx(n: Vec3, v: Vec3, roughness: f32) -> f32 {
        let a = roughness * roughness;
        let k = (a + 1.0) * (a + 1.0) / 8.0;

        let d = n.dot(v);
        d / (d * (1.0 - k) + k)
    }

    /// Smith joint masking-shadowing. `v` points from the eye toward the surface.
    pub fn geometry_smith(n: Vec3, v: Vec3, l: Vec3, roughness: f32) -> f32 {
        geometry_schlick_ggx(n, -v, roughness) * geometry_schlick_ggx(n, l, roughness)
    }
}

#[cfg(test)]
mod tests {
    use super::microfacet::*;
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_lambert_divides_by_pi() {
        let c = lambert(7.0, ColorRGB::new(1.0, 0.5, 0.0));
        assert!(approx(c.r, 7.0 / PI));
        assert!(approx(c.g, 3.5 / PI));
        assert!(approx(c.b, 0.0));
    }

    #[test]
    fn test_phong_peaks_on_mirror_direction() {
        let n = Vec3::UNIT_Y;
        let to_light = Vec3::new(1.0, 1.0, 0.0).normalize();
        // Eye looking down at the surface along the mirrored light ray
        let v = Vec3::new(1.0, -1.0, 0.0).normalize();
        let c = phong(1.0, 25.0, to_light, v, n);
        assert!(approx(c.r, 1.0));
    }

    #[test]
    fn test_phong_black_when_facing_away() {
        let n = Vec3::UNIT_Y;
        let to_light = Vec3::new(1.0, 1.0, 0.0).normalize();
        let v = Vec3::new(-1.0, 1.0, 0.0).normalize();
        assert_eq!(phong(1.0, 25.0, to_light, v, n), ColorRGB::BLACK);
    }

    #[test]
    fn test_fresnel_at_normal_incidence_is_f0() {
        let f0 = ColorRGB::gray(0.04);
        let f = fresnel_schlick(Vec3::UNIT_Z, Vec3::UNIT_Z, f0);
        assert!(approx(f.r, 0.04));
        let grazing = fresnel_schlick(Vec3::UNIT_Z, Vec3::UNIT_X, f0);
        assert!(approx(grazing.r, 1.0));
    }

    #[test]
    fn test_ggx_peak_for_aligned_half_vector() {
        let roughness = 0.5f32;
        let a2 = roughness.powi(4);
        let d = normal_distribution_ggx(Vec3::UNIT_Y, Vec3::UNIT_Y, roughness);
        assert!(approx(d, 1.0 / (PI * a2)));
        assert_eq!(normal_distribution_ggx(Vec3::UNIT_Y, -Vec3::UNIT_Y, roughness), 0.0);
    }

    #[test]
    fn test_smith_is_one_head_on() {
        let n = Vec3::UNIT_Y;
        let g = geometry_smith(n, -n, n, 0.5);
        assert!(approx(g, 1.0));
    }
}
