//! Track value typing from naming conventions
//!
//! Track data blocks carry no value type. The type is decided here, from
//! the group type and the track name, before any bits are unpacked.

use super::GroupType;

/// Value type of a track's frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Transform,
    UvTransform,
    Float,
    PatternIndex,
    Boolean,
    Vector4,
    Unknown,
}

impl TrackKind {
    /// Floats stored per frame, or `None` when any count is accepted
    pub const fn component_count(self) -> Option<usize> {
        match self {
            Self::Transform => Some(11),
            Self::UvTransform => Some(5),
            Self::Vector4 => Some(4),
            Self::Float | Self::PatternIndex | Self::Boolean => Some(1),
            Self::Unknown => None,
        }
    }
}

const CAMERA_FLOAT_TRACKS: [&str; 3] = ["FieldOfView", "NearClip", "FarClip"];

/// Decide a track's value type from its name. The first matching rule wins.
///
/// ```
/// use ssbh_data::formats::anim::{GroupType, TrackKind, classify_track};
///
/// assert_eq!(classify_track(GroupType::Material, "CustomVector31"), TrackKind::Vector4);
/// assert_eq!(classify_track(GroupType::Camera, "FieldOfView"), TrackKind::Float);
/// assert_eq!(classify_track(GroupType::Material, "Unnamed"), TrackKind::Unknown);
/// ```
pub fn classify_track(group_type: GroupType, track_name: &str) -> TrackKind {
    if track_name == "Transform" {
        TrackKind::Transform
    } else if track_name == "Visibility" || track_name.contains("CustomBoolean") {
        TrackKind::Boolean
    } else if track_name.ends_with(".PatternIndex") {
        TrackKind::PatternIndex
    } else if track_name.contains("CustomVector") {
        TrackKind::Vector4
    } else if track_name.contains("CustomFloat")
        || (group_type == GroupType::Camera && CAMERA_FLOAT_TRACKS.contains(&track_name))
    {
        TrackKind::Float
    } else if track_name.contains("Texture") {
        TrackKind::UvTransform
    } else {
        TrackKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_transform_and_visibility() {
        assert_eq!(classify_track(GroupType::Transform, "Transform"), TrackKind::Transform);
        assert_eq!(classify_track(GroupType::Visibility, "Visibility"), TrackKind::Boolean);
        // Exact names only.
        assert_eq!(classify_track(GroupType::Transform, "Transforms"), TrackKind::Unknown);
    }

    #[test]
    fn test_classify_material_tracks() {
        let m = GroupType::Material;
        assert_eq!(classify_track(m, "CustomBoolean1"), TrackKind::Boolean);
        assert_eq!(classify_track(m, "CustomVector8"), TrackKind::Vector4);
        assert_eq!(classify_track(m, "CustomFloat4"), TrackKind::Float);
        assert_eq!(classify_track(m, "Texture0"), TrackKind::UvTransform);
        assert_eq!(classify_track(m, "Texture0.PatternIndex"), TrackKind::PatternIndex);
    }

    #[test]
    fn test_first_rule_wins() {
        // Pattern index outranks the texture rule and boolean outranks vector.
        assert_eq!(
            classify_track(GroupType::Material, "Texture4.PatternIndex"),
            TrackKind::PatternIndex
        );
        assert_eq!(
            classify_track(GroupType::Material, "CustomBooleanCustomVector"),
            TrackKind::Boolean
        );
    }

    #[test]
    fn test_camera_floats_need_camera_group() {
        for name in CAMERA_FLOAT_TRACKS {
            assert_eq!(classify_track(GroupType::Camera, name), TrackKind::Float);
            assert_eq!(classify_track(GroupType::Material, name), TrackKind::Unknown);
        }
    }

    #[test]
    fn test_component_counts() {
        assert_eq!(TrackKind::Transform.component_count(), Some(11));
        assert_eq!(TrackKind::UvTransform.component_count(), Some(5));
        assert_eq!(TrackKind::Vector4.component_count(), Some(4));
        assert_eq!(TrackKind::PatternIndex.component_count(), Some(1));
        assert_eq!(TrackKind::Unknown.component_count(), None);
    }
}
