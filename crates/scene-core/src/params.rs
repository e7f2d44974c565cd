use crate::clock::DecayClock;
use crate::constants::*;
use crate::particles::BurstParams;
use crate::phase::RevealPolicy;
use fnv::FnvHashMap;

/// Runtime scene configuration. Defaults reproduce the tuned demo; the web
/// front-end may override fields from the page query string.
#[derive(Clone, Debug)]
pub struct SceneParams {
    pub seed: Option<u64>,
    pub burst: BurstParams,
    pub swarm_count: usize,
    pub swarm_trail_len: usize,
    pub reveal: RevealPolicy,
    pub reveal_hold_secs: f32,
    pub base_zoom: f32,
    pub texture_size: u32,
    pub decay_clock: DecayClock,
    pub model_url: String,
    pub image_url: String,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            seed: None,
            burst: BurstParams {
                count: PARTICLE_COUNT,
                lifetime_min: PARTICLE_LIFETIME_MIN,
                lifetime_max: PARTICLE_LIFETIME_MAX,
                speed_min: PARTICLE_SPEED_MIN,
                speed_max: PARTICLE_SPEED_MAX,
            },
            swarm_count: SWARM_COUNT,
            swarm_trail_len: SWARM_TRAIL_LEN,
            reveal: RevealPolicy::near_end_fraction(),
            reveal_hold_secs: REVEAL_HOLD_SECS,
            base_zoom: CAMERA_BASE_ZOOM,
            texture_size: TEXTURE_SIZE,
            decay_clock: DecayClock::PerFrame,
            model_url: "assets/model.glb".to_string(),
            image_url: "assets/reveal.png".to_string(),
        }
    }
}

impl SceneParams {
    /// Apply `key=value` overrides from a URL query (leading `?` optional).
    ///
    /// Unknown keys and unparsable values are logged and ignored so a typo in
    /// the address bar never prevents the scene from starting. Counts are
    /// clamped to the `MAX_*` ceilings; non-finite floats are rejected, and
    /// `zoom` must stay beyond the beat pull so the eye never reaches the
    /// origin.
    pub fn apply_query(&mut self, query: &str) {
        let pairs = parse_query(query);
        for (key, value) in &pairs {
            let ok = match *key {
                "seed" => value.parse().map(|v| self.seed = Some(v)).is_ok(),
                "particles" => value
                    .parse::<usize>()
                    .map(|v| self.burst.count = v.clamp(1, MAX_PARTICLE_COUNT))
                    .is_ok(),
                "swarm" => value
                    .parse::<usize>()
                    .map(|v| self.swarm_count = v.min(MAX_SWARM_COUNT))
                    .is_ok(),
                "trail" => value
                    .parse::<usize>()
                    .map(|v| self.swarm_trail_len = v.clamp(1, MAX_SWARM_TRAIL_LEN))
                    .is_ok(),
                "hold" => parse_finite(value)
                    .map(|v| self.reveal_hold_secs = v.max(0.0))
                    .is_some(),
                "zoom" => parse_finite(value)
                    .filter(|v| *v > CAMERA_ZOOM_BEAT_PULL)
                    .map(|v| self.base_zoom = v)
                    .is_some(),
                "reveal" => match *value {
                    "model" => {
                        self.reveal = RevealPolicy::near_end_fraction();
                        true
                    }
                    "image" => {
                        self.reveal = RevealPolicy::FullCompletion;
                        true
                    }
                    _ => false,
                },
                "clock" => match *value {
                    "frame" => {
                        self.decay_clock = DecayClock::PerFrame;
                        true
                    }
                    "second" => {
                        self.decay_clock = DecayClock::per_second();
                        true
                    }
                    _ => false,
                },
                "model" if !value.is_empty() => {
                    self.model_url = value.to_string();
                    true
                }
                "image" if !value.is_empty() => {
                    self.image_url = value.to_string();
                    true
                }
                _ => false,
            };
            if !ok {
                log::warn!("ignoring query parameter {}={}", key, value);
            }
        }
    }
}

fn parse_finite(value: &str) -> Option<f32> {
    value.parse::<f32>().ok().filter(|v| v.is_finite())
}

fn parse_query(query: &str) -> FnvHashMap<&str, &str> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|kv| !kv.is_empty())
        .map(|kv| match kv.split_once('=') {
            Some((k, v)) => (k, v),
            None => (kv, ""),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuning() {
        let p = SceneParams::default();
        assert_eq!(p.burst.lifetime_min, 2.0);
        assert_eq!(p.burst.lifetime_max, 4.0);
        assert!(matches!(p.reveal, RevealPolicy::NearEndFraction { .. }));
        assert_eq!(p.decay_clock, DecayClock::PerFrame);
    }

    #[test]
    fn query_overrides_known_keys() {
        let mut p = SceneParams::default();
        p.apply_query("?seed=42&particles=500&reveal=image&clock=second&model=m.glb&hold=2.5");
        assert_eq!(p.seed, Some(42));
        assert_eq!(p.burst.count, 500);
        assert!(matches!(p.reveal, RevealPolicy::FullCompletion));
        assert!(matches!(p.decay_clock, DecayClock::PerSecond { .. }));
        assert_eq!(p.model_url, "m.glb");
        assert_eq!(p.reveal_hold_secs, 2.5);
    }

    #[test]
    fn bad_values_leave_defaults() {
        let mut p = SceneParams::default();
        p.apply_query("particles=lots&reveal=sideways&flag&=x&particles2=1");
        assert_eq!(p.burst.count, PARTICLE_COUNT);
        assert!(matches!(p.reveal, RevealPolicy::NearEndFraction { .. }));

        for query in ["zoom=NaN", "zoom=-3", "zoom=0", "zoom=inf", "zoom=1.5"] {
            let mut p = SceneParams::default();
            p.apply_query(query);
            assert_eq!(p.base_zoom, CAMERA_BASE_ZOOM, "{query}");
        }
        for query in ["hold=inf", "hold=NaN", "hold=-inf"] {
            let mut p = SceneParams::default();
            p.apply_query(query);
            assert_eq!(p.reveal_hold_secs, REVEAL_HOLD_SECS, "{query}");
        }
        let mut p = SceneParams::default();
        p.apply_query("swarm=99999999999999999999999");
        assert_eq!(p.swarm_count, SWARM_COUNT);
    }

    #[test]
    fn huge_counts_are_clamped() {
        let mut p = SceneParams::default();
        p.apply_query("particles=100000000&swarm=50000000&trail=1000");
        assert_eq!(p.burst.count, MAX_PARTICLE_COUNT);
        assert_eq!(p.swarm_count, MAX_SWARM_COUNT);
        assert_eq!(p.swarm_trail_len, MAX_SWARM_TRAIL_LEN);
    }

    #[test]
    fn in_range_floats_are_accepted() {
        let mut p = SceneParams::default();
        p.apply_query("zoom=9.5&hold=-2");
        assert_eq!(p.base_zoom, 9.5);
        assert_eq!(p.reveal_hold_secs, 0.0);
    }

    #[test]
    fn particle_count_has_floor_of_one() {
        let mut p = SceneParams::default();
        p.apply_query("particles=0");
        assert_eq!(p.burst.count, 1);
    }
}
