//! Contract Definitions
//!
//! Solidity interfaces used by the engine, defined with alloy's `sol!` macro.
//! Each interface carries `#[sol(rpc)]` so it can be instantiated against
//! any alloy Provider.
//!
//! Both venues are Uniswap V2 forks, so one set of factory/pair/router
//! interfaces covers them.
//!
//! Created: 2026-10-17

use alloy::sol;

// ── ERC20 ─────────────────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }
}

// ── Uniswap V2 ───────────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }
}

sol! {
    #[sol(rpc)]
    interface IUniswapV2Pair {
        event Swap(address indexed sender, uint256 amount0In, uint256 amount1In, uint256 amount0Out, uint256 amount1Out, address indexed to);

        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }
}

sol! {
    #[sol(rpc)]
    interface IUniswapV2Router02 {
        function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts);
        function getAmountsIn(uint256 amountOut, address[] calldata path) external view returns (uint256[] memory amounts);
    }
}

// ── Flash swap executor (custom atomic borrow/swap/repay contract) ───

sol! {
    #[sol(rpc)]
    interface IFlashSwap {
        function testFlashSwap(address _tokenBorrow, uint256 _amount, bool _startOnUniswap) external;
    }
}
