//! Tests for canvas expansion, initial tile placement and tile movement

#[cfg(test)]
mod tests {
    use outpainter::spatial::geometry::{
        Dimensions, Direction, Expansion, Point, Rect, compute_expansion, initial_tile_origin,
        move_tile,
    };

    // Tests that padding always sums to the canvas growth on both axes
    // Verified by rounding the trailing share independently
    #[test]
    fn test_expansion_sums_to_growth() {
        let inputs = [(512, 512), (333, 777), (1, 1), (640, 480)];
        let growths = [(0, 0), (1, 1), (511, 257), (1024, 3)];

        for &(in_w, in_h) in &inputs {
            for &(grow_w, grow_h) in &growths {
                let input = Dimensions::new(in_w, in_h);
                let output = Dimensions::new(in_w + grow_w, in_h + grow_h);
                for focal in [
                    Point::new(0, 0),
                    input.center(),
                    Point::new(in_w - 1, in_h - 1),
                ] {
                    let expansion = compute_expansion(focal, input, output);
                    assert_eq!(expansion.left + expansion.right, grow_w);
                    assert_eq!(expansion.top + expansion.bottom, grow_h);
                }
            }
        }
    }

    // Tests centered focal point splits padding evenly
    // Verified by swapping leading and trailing shares
    #[test]
    fn test_centered_focal_balances_padding() {
        let input = Dimensions::new(512, 512);
        let output = Dimensions::new(1024, 768);
        let expansion = compute_expansion(input.center(), input, output);

        assert_eq!(
            expansion,
            Expansion {
                left: 256,
                right: 256,
                top: 128,
                bottom: 128,
            }
        );

        let odd = compute_expansion(input.center(), input, Dimensions::new(1025, 771));
        assert!(odd.left.abs_diff(odd.right) <= 1);
        assert!(odd.top.abs_diff(odd.bottom) <= 1);
    }

    // Tests the leading share is floored
    // Verified by rounding to nearest
    #[test]
    fn test_expansion_floors_leading_share() {
        // 100 * 2/3 = 66.67
        let expansion =
            compute_expansion(Point::new(2, 2), Dimensions::new(3, 3), Dimensions::new(103, 103));
        assert_eq!(expansion.left, 66);
        assert_eq!(expansion.right, 34);
    }

    // Tests focal points at the image edge put all padding on one side
    // Verified by measuring the fraction from the far edge
    #[test]
    fn test_expansion_at_origin() {
        let expansion =
            compute_expansion(Point::new(0, 0), Dimensions::new(100, 50), Dimensions::new(300, 90));
        assert_eq!(expansion.left, 0);
        assert_eq!(expansion.right, 200);
        assert_eq!(expansion.top, 0);
        assert_eq!(expansion.bottom, 40);
        assert_eq!(expansion.origin(), Point::new(0, 0));
    }

    // Tests equal input and output sizes yield no padding
    // Verified by computing growth from the output size alone
    #[test]
    fn test_expansion_degenerate_axis() {
        let expansion = compute_expansion(
            Point::new(10, 10),
            Dimensions::new(64, 64),
            Dimensions::new(64, 128),
        );
        assert_eq!(expansion.left, 0);
        assert_eq!(expansion.right, 0);
        assert_eq!(expansion.top + expansion.bottom, 64);
    }

    // Tests out-of-image focal points are clamped
    // Verified by removing the clamp
    #[test]
    fn test_expansion_clamps_focal_point() {
        let expansion = compute_expansion(
            Point::new(500, 500),
            Dimensions::new(100, 100),
            Dimensions::new(200, 200),
        );
        assert_eq!(expansion.left + expansion.right, 100);
        assert!(expansion.left <= 100);
        assert_eq!(expansion.left, 99);
    }

    // Tests initial tile centering over the pasted original
    // Verified by centering on the canvas instead
    #[test]
    fn test_initial_tile_origin_centered() {
        let expansion = Expansion {
            left: 256,
            right: 256,
            top: 128,
            bottom: 128,
        };
        let origin = initial_tile_origin(expansion, 256, Dimensions::new(512, 512));
        assert_eq!(origin, Point::new(384, 256));
    }

    // Tests tiles larger than the original clamp to zero
    // Verified by removing the lower clamp
    #[test]
    fn test_initial_tile_origin_clamps_to_zero() {
        let expansion = Expansion {
            left: 10,
            right: 500,
            top: 0,
            bottom: 0,
        };
        let origin = initial_tile_origin(expansion, 1024, Dimensions::new(512, 512));
        assert_eq!(origin, Point::new(0, 0));
    }

    // Tests odd size differences truncate toward zero
    // Verified by using floor division
    #[test]
    fn test_initial_tile_origin_truncates() {
        let expansion = Expansion {
            left: 10,
            right: 0,
            top: 10,
            bottom: 0,
        };
        // (256 - 257) / 2 truncates to 0, (257 - 256) / 2 truncates to 0
        let origin = initial_tile_origin(expansion, 256, Dimensions::new(257, 255));
        assert_eq!(origin, Point::new(10, 10));
    }

    // Tests each direction moves by one step
    // Verified by swapping axis in the direction mapping
    #[test]
    fn test_move_tile_each_direction() {
        let canvas = Dimensions::new(1024, 1024);
        let origin = Point::new(300, 300);

        assert_eq!(
            move_tile(origin, Direction::Up, 100, 256, canvas),
            Some(Point::new(300, 200))
        );
        assert_eq!(
            move_tile(origin, Direction::Down, 100, 256, canvas),
            Some(Point::new(300, 400))
        );
        assert_eq!(
            move_tile(origin, Direction::Left, 100, 256, canvas),
            Some(Point::new(200, 300))
        );
        assert_eq!(
            move_tile(origin, Direction::Right, 100, 256, canvas),
            Some(Point::new(400, 300))
        );
    }

    // Tests movement clamps at the canvas edges and then stops
    // Verified by removing the far-edge clamp
    #[test]
    fn test_move_tile_clamps_then_stops() {
        let canvas = Dimensions::new(1000, 600);

        let clamped = move_tile(Point::new(700, 0), Direction::Right, 100, 256, canvas);
        assert_eq!(clamped, Some(Point::new(744, 0)));
        assert_eq!(
            move_tile(Point::new(744, 0), Direction::Right, 100, 256, canvas),
            None
        );

        assert_eq!(
            move_tile(Point::new(0, 50), Direction::Up, 100, 256, canvas),
            Some(Point::new(0, 0))
        );
        assert_eq!(move_tile(Point::new(0, 0), Direction::Up, 100, 256, canvas), None);
        assert_eq!(move_tile(Point::new(0, 0), Direction::Left, 100, 256, canvas), None);
        assert_eq!(
            move_tile(Point::new(0, 344), Direction::Down, 100, 256, canvas),
            None
        );
    }

    // Tests steps larger than the canvas reach the edge in one move
    // Verified by letting oversized steps overshoot the canvas
    #[test]
    fn test_move_tile_oversized_step() {
        let canvas = Dimensions::new(512, 512);
        let step = 10_000;

        let first = move_tile(Point::new(128, 128), Direction::Right, step, 256, canvas);
        assert_eq!(first, Some(Point::new(256, 128)));
        assert_eq!(move_tile(Point::new(256, 128), Direction::Right, step, 256, canvas), None);

        // Already on the edge: the first call stops
        assert_eq!(move_tile(Point::new(0, 128), Direction::Left, step, 256, canvas), None);
        assert_eq!(move_tile(Point::new(128, 256), Direction::Down, step, 256, canvas), None);
    }

    // Tests tiles wider than the canvas never move right or down
    // Verified by allowing the far clamp to go negative
    #[test]
    fn test_move_tile_larger_than_canvas() {
        let canvas = Dimensions::new(200, 200);
        assert_eq!(move_tile(Point::new(0, 0), Direction::Right, 50, 256, canvas), None);
        assert_eq!(move_tile(Point::new(0, 0), Direction::Down, 50, 256, canvas), None);
    }

    // Tests an off-origin tile that spans the canvas stays where it is
    // Verified by clamping right and down below the current origin
    #[test]
    fn test_move_tile_spanning_tile_never_moves() {
        let canvas = Dimensions::new(200, 200);
        let origin = Point::new(21, 21);

        for direction in Direction::ALL {
            assert_eq!(move_tile(origin, direction, 128, 256, canvas), None);
        }

        // Spanning only the width still allows vertical moves
        let tall = Dimensions::new(200, 1000);
        assert_eq!(move_tile(origin, Direction::Left, 128, 256, tall), None);
        assert_eq!(move_tile(origin, Direction::Right, 128, 256, tall), None);
        assert_eq!(
            move_tile(origin, Direction::Down, 128, 256, tall),
            Some(Point::new(21, 149))
        );
    }

    // Tests rectangle overlap excludes shared edges
    // Verified by using inclusive comparisons
    #[test]
    fn test_rect_intersects_open_interval() {
        let tile = Rect::new(0, 0, 10, 10);
        assert!(!tile.intersects(&Rect::new(10, 0, 20, 10)));
        assert!(!tile.intersects(&Rect::new(0, 10, 10, 20)));
        assert!(tile.intersects(&Rect::new(5, 5, 15, 15)));
        assert!(tile.intersects(&Rect::new(2, 2, 3, 3)));
    }

    // Tests containment, tiles and centers
    // Verified by testing containment against the wrong corner
    #[test]
    fn test_rect_helpers() {
        let outer = Rect::new(10, 10, 100, 100);
        assert!(outer.contains(&Rect::new(10, 10, 100, 100)));
        assert!(outer.contains(&Rect::new(20, 20, 30, 30)));
        assert!(!outer.contains(&Rect::new(5, 20, 30, 30)));
        assert!(!outer.contains(&Rect::new(20, 20, 101, 30)));

        assert_eq!(Rect::tile(Point::new(3, 4), 5), Rect::new(3, 4, 8, 9));
        assert_eq!(Rect::new(0, 0, 100, 50).center(), Point::new(50, 25));
        assert_eq!(Rect::new(1, 1, 2, 2).offset(10, 20), Rect::new(11, 21, 12, 22));
        assert_eq!(
            Rect::from_origin(Point::new(5, 5), Dimensions::new(10, 20)),
            Rect::new(5, 5, 15, 25)
        );
    }

    // Tests direction labels and ray order
    // Verified by reordering the direction list
    #[test]
    fn test_direction_order_and_labels() {
        let labels: Vec<&str> = Direction::ALL.iter().map(|d| d.label()).collect();
        assert_eq!(labels, vec!["up", "left", "right", "down"]);
    }
}
