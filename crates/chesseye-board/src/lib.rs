//! Board localization: pick the chessboard outline out of a set of binary
//! contours and rectify it into a canonical top-down color view.

mod binarize;
mod locate;
mod normalize;

pub use binarize::adaptive_threshold_mean;
pub use locate::{locate_board, order_corners, BoardParams, OrderedCorners};
pub use normalize::normalize_board;
