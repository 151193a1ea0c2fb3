use crate::model::group::{Group, Room, RoomAssignment};

/// Gives the n-th group room `room_start + n`. `room_start` is taken as is.
pub fn assign_rooms(groups: &[Group], room_start: i64) -> RoomAssignment {
    RoomAssignment {
        rooms: (room_start..)
            .zip(groups)
            .map(|(number, group)| Room {
                number,
                group: group.clone(),
            })
            .collect(),
    }
}
